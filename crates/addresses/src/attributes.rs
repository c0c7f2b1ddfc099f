//! Free-form attribute mapping (column name → JSON value).

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use addressable_core::{DomainError, DomainResult};

/// Attribute set as supplied by callers and as stored in record columns.
///
/// Keys are column names; iteration order is the key order of the underlying
/// map (sorted, since `serde_json` is built without `preserve_order`).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(Map<String, JsonValue>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a JSON object; anything else is rejected.
    pub fn from_json(value: JsonValue) -> DomainResult<Self> {
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(DomainError::failed_validation(format!(
                "[Addresses] Attributes must be an object, got {other}"
            ))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key)
    }

    /// Like `get`, but treats JSON `null` as absent.
    pub fn get_present(&self, key: &str) -> Option<&JsonValue> {
        self.0.get(key).filter(|v| !v.is_null())
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(JsonValue::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Option<JsonValue> {
        self.0.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<JsonValue> {
        self.0.remove(key)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&str, &JsonValue) -> bool) {
        self.0.retain(|k, v| keep(k, v));
    }

    /// Overlay `other` onto `self` (keys in `other` win).
    pub fn merge(&mut self, other: Attributes) {
        for (k, v) in other.0 {
            self.0.insert(k, v);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.0.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.keys()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_json(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for Attributes {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl IntoIterator for Attributes {
    type Item = (String, JsonValue);
    type IntoIter = serde_json::map::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl From<Map<String, JsonValue>> for Attributes {
    fn from(value: Map<String, JsonValue>) -> Self {
        Self(value)
    }
}
