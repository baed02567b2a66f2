//! Location tracking for parse, serialize, and conversion errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Ordered location of a value inside a schema tree, root first.
///
/// Segments are field names, dict keys, or item indexes. Errors are built at
/// the failure point with an empty path and each enclosing frame prepends
/// its own segment while the error travels back to the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<String>);

impl Path {
    /// The empty path, rendered as `root`
    #[must_use]
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Build a path from segments listed root first
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Insert a segment in front of the existing ones
    pub fn prepend(&mut self, segment: impl Into<String>) {
        self.0.insert(0, segment.into());
    }

    /// Append a segment after the existing ones
    pub fn push(&mut self, segment: impl Into<String>) {
        self.0.push(segment.into());
    }

    /// Whether this is the root location
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments, root first
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Number of segments
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no segments
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("root");
        }
        for segment in &self.0 {
            write!(f, "[\"{segment}\"]")?;
        }
        Ok(())
    }
}
