//! Opaque attribute trees exchanged with backend clients.

use serde_json::{Map, Value};

/// Opaque string-keyed attribute mapping.
///
/// Compute resources, virtual machines, and nested UI collections all carry
/// free-form attribute trees whose exact keys are owned by the concrete
/// backend. Values nest arbitrarily, so the JSON object model is used
/// directly (stored as JSONB by the postgres adapter).
pub type AttrMap = Map<String, Value>;

/// Builds an attribute mapping from `(key, value)` pairs.
///
/// Convenience for call sites assembling small parameter maps inline.
#[must_use]
pub fn attr_map<K, V, I>(entries: I) -> AttrMap
where
    K: Into<String>,
    V: Into<Value>,
    I: IntoIterator<Item = (K, V)>,
{
    entries
        .into_iter()
        .map(|(key, value)| (key.into(), value.into()))
        .collect()
}
