//! The record data model.

use std::collections::BTreeMap;

pub use serde_json::Value;

/// A single logical record: a string-keyed map of scalar or array values.
///
/// Records are the unit of storage for every backend mapper. The `BTreeMap`
/// keeps keys in sorted order at all times, so any record handed to a caller
/// or to a cache is already normalized and two records with the same content
/// compare equal regardless of insertion order.
pub type Record = BTreeMap<String, Value>;

/// Builds a record from an iterator of key/value pairs.
///
/// Convenience for tests and callers assembling records inline.
pub fn record_from<I, K>(pairs: I) -> Record
where
    I: IntoIterator<Item = (K, Value)>,
    K: Into<String>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}
