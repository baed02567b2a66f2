//! Shared helpers for the integration suites

use serde_json::Value;
use std::sync::Once;
use struct_json_schema::JsonSchema;

static INIT: Once = Once::new();

/// Route `tracing` output to the test harness once per binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Build a fragment from a `json!` literal
#[allow(dead_code)]
pub fn fragment(value: Value) -> JsonSchema {
    JsonSchema::try_from(value).expect("test fragments are objects")
}
