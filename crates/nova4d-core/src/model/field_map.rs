use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Ordered-irrelevant string-keyed bag of JSON values
///
/// Backs both command payloads and command metadata. Merging follows
/// "later source wins per key": [`FieldMap::merge`] overwrites existing keys
/// with the incoming ones and keeps everything else.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldMap(Map<String, Value>);

/// Command payload sent to the remote application
pub type Payload = FieldMap;

/// Bookkeeping attached to a queued command (`requested_by`, `client_hint`, ...)
pub type Metadata = FieldMap;

impl FieldMap {
    pub fn new() -> Self {
        Self(Map::new())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Insert a value, returning the one it replaced
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
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

    /// Overlay `other` onto `self`; keys in `other` win
    pub fn merge(&mut self, other: FieldMap) {
        for (key, value) in other.0 {
            self.0.insert(key, value);
        }
    }

    /// Interpret an arbitrary JSON value as a field map
    ///
    /// Only JSON objects carry fields; anything else yields an empty map.
    pub fn from_value(value: Option<&Value>) -> FieldMap {
        match value {
            Some(Value::Object(map)) => FieldMap(map.clone()),
            _ => FieldMap::new(),
        }
    }


}

impl From<Map<String, Value>> for FieldMap {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<FieldMap> for Value {
    fn from(map: FieldMap) -> Self {
        Value::Object(map.0)
    }
}

impl FromIterator<(String, Value)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
