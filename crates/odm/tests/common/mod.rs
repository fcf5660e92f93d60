//! Shared helpers for integration tests

#![allow(dead_code)]

use std::sync::Once;

use elif_odm::Attributes;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

static TRACING: Once = Once::new();

/// Install a test subscriber honouring `RUST_LOG`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn attrs(value: Value) -> Attributes {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {}", other),
    }
}
