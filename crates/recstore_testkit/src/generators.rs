//! Property-based test generators using proptest.

use proptest::prelude::*;
use recstore_mapper::{Record, Value};

/// Strategy for record keys.
pub fn key_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9_]{0,15}").expect("valid regex")
}

/// Strategy for scalar record values.
pub fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| Value::Number(n.into())),
        "[ -~]{0,24}".prop_map(Value::String),
    ]
}

/// Strategy for record values: scalars or flat arrays of scalars.
pub fn value_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => scalar_strategy(),
        1 => prop::collection::vec(scalar_strategy(), 0..4).prop_map(Value::Array),
    ]
}

/// Strategy for whole records.
pub fn record_strategy() -> impl Strategy<Value = Record> {
    prop::collection::btree_map(key_strategy(), value_strategy(), 0..8)
}
