//! Capability payload sent once when a session is negotiated.

use serde::Serialize;
use serde_json::{Map, Value};

/// An ordered mapping from capability name to value.
///
/// Entries keep their insertion order so that serialized payloads are stable.
/// Once built the value is only read; there is no way to remove entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Capabilities(Map<String, Value>);

impl Capabilities {
    /// Create an empty capability set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a capability, replacing any earlier value under the same name.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style variant of [`Capabilities::set`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Capability names in insertion order.
    pub fn names(&self) -> Vec<&str> {
        self.0.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the capabilities as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<Map<String, Value>> for Capabilities {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
