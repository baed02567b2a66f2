//! Refinements layered on top of a base schema kind
//!
//! A check narrows the set of values a schema accepts without changing the
//! value's shape. Checks run after the structural parse succeeded and only
//! look at values of the kind they were written for, so a string check on a
//! number is a no-op rather than an error.

use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Predicate used by [`CustomCheck`]
pub type CheckFn = Arc<dyn Fn(&Value) -> Result<(), String> + Send + Sync>;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email regex is valid")
});

static UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("uuid regex is valid")
});

static CUID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^c[^\s-]{8,}$").expect("cuid regex is valid"));

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://\S+$").expect("url regex is valid")
});

/// Any refinement attached to a schema
#[derive(Debug, Clone)]
pub enum Check {
    String(StringCheck),
    Int(IntCheck),
    Float(FloatCheck),
    Array(ArrayCheck),
    Custom(CustomCheck),
}

/// Refinements of string schemas
#[derive(Debug, Clone)]
pub enum StringCheck {
    Min(usize),
    Max(usize),
    Length(usize),
    Email,
    Uuid,
    Cuid,
    Url,
    Pattern(Regex),
    Datetime,
}

/// Refinements of integer schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntCheck {
    Min(i64),
    Max(i64),
    Port,
}

/// Refinements of float schemas
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FloatCheck {
    Min(f64),
    Max(f64),
    ExclusiveMin(f64),
    ExclusiveMax(f64),
}

/// Refinements of array schemas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArrayCheck {
    Min(usize),
    Max(usize),
    Length(usize),
}

/// Caller-supplied predicate with a name used in diagnostics
#[derive(Clone)]
pub struct CustomCheck {
    name: String,
    predicate: CheckFn,
}

impl CustomCheck {
    /// Create a named predicate check
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&Value) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Name given at construction
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for CustomCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomCheck")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl Check {
    /// Run the check against a structurally valid value
    ///
    /// # Errors
    ///
    /// Returns the human-readable reason when the value is rejected.
    pub fn run(&self, value: &Value) -> Result<(), String> {
        match self {
            Check::String(check) => match value {
                Value::String(s) => check.run(s),
                _ => Ok(()),
            },
            Check::Int(check) => match value.as_i64() {
                Some(n) => check.run(n),
                None => Ok(()),
            },
            Check::Float(check) => match value.as_f64() {
                Some(n) => check.run(n),
                None => Ok(()),
            },
            Check::Array(check) => match value {
                Value::Array(items) => check.run(items.len()),
                _ => Ok(()),
            },
            Check::Custom(check) => (check.predicate)(value),
        }
    }
}

impl StringCheck {
    fn run(&self, value: &str) -> Result<(), String> {
        let len = value.chars().count();
        match self {
            StringCheck::Min(min) if len < *min => Err(format!(
                "String must be {min} or more characters long"
            )),
            StringCheck::Max(max) if len > *max => Err(format!(
                "String must be {max} or fewer characters long"
            )),
            StringCheck::Length(exact) if len != *exact => Err(format!(
                "String must be exactly {exact} characters long"
            )),
            StringCheck::Email if !EMAIL.is_match(value) => Err("Invalid email address".to_string()),
            StringCheck::Uuid if !UUID.is_match(value) => Err("Invalid UUID".to_string()),
            StringCheck::Cuid if !CUID.is_match(value) => Err("Invalid CUID".to_string()),
            StringCheck::Url if !URL.is_match(value) => Err("Invalid url".to_string()),
            StringCheck::Pattern(re) if !re.is_match(value) => Err("Invalid".to_string()),
            StringCheck::Datetime if chrono::DateTime::parse_from_rfc3339(value).is_err() => Err(
                "Invalid datetime string! Expected UTC".to_string(),
            ),
            _ => Ok(()),
        }
    }
}

impl IntCheck {
    fn run(self, value: i64) -> Result<(), String> {
        match self {
            IntCheck::Min(min) if value < min => {
                Err(format!("Number must be greater than or equal to {min}"))
            }
            IntCheck::Max(max) if value > max => {
                Err(format!("Number must be lower than or equal to {max}"))
            }
            IntCheck::Port if !(0..=65535).contains(&value) => Err("Invalid port".to_string()),
            _ => Ok(()),
        }
    }
}

impl FloatCheck {
    fn run(self, value: f64) -> Result<(), String> {
        match self {
            FloatCheck::Min(min) if value < min => {
                Err(format!("Number must be greater than or equal to {min}"))
            }
            FloatCheck::Max(max) if value > max => {
                Err(format!("Number must be lower than or equal to {max}"))
            }
            FloatCheck::ExclusiveMin(min) if value <= min => {
                Err(format!("Number must be greater than {min}"))
            }
            FloatCheck::ExclusiveMax(max) if value >= max => {
                Err(format!("Number must be lower than {max}"))
            }
            _ => Ok(()),
        }
    }
}

impl ArrayCheck {
    fn run(self, len: usize) -> Result<(), String> {
        match self {
            ArrayCheck::Min(min) if len < min => {
                Err(format!("Array must be {min} or more items long"))
            }
            ArrayCheck::Max(max) if len > max => {
                Err(format!("Array must be {max} or fewer items long"))
            }
            ArrayCheck::Length(exact) if len != exact => {
                Err(format!("Array must be exactly {exact} items long"))
            }
            _ => Ok(()),
        }
    }
}
