//! Runtime context passed alongside every network call
//!
//! The context is a free-form key/value bag. A request sees the ambient
//! context of the server merged with whatever the caller supplied in the
//! request body, where caller values replace ambient ones on key collision.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuntimeContext {
    values: Map<String, Value>,
}

impl RuntimeContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self { values }
    }

    /// Parse a JSON object, e.g. the `x-runtime-context` header value
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        let values: Map<String, Value> = serde_json::from_str(raw)?;
        Ok(Self { values })
    }

    /// Insert or replace a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Overlay `other` onto this context in place
    pub fn extend(&mut self, other: &Map<String, Value>) {
        for (key, value) in other {
            self.values.insert(key.clone(), value.clone());
        }
    }

    /// Build the effective context for one call.
    ///
    /// Every ambient entry is kept; each override entry is applied on top.
    /// `self` is left untouched.
    pub fn merged_with(&self, overrides: Option<&Map<String, Value>>) -> Self {
        let mut merged = self.clone();
        if let Some(overrides) = overrides {
            merged.extend(overrides);
        }
        merged
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }
}

impl From<Map<String, Value>> for RuntimeContext {
    fn from(values: Map<String, Value>) -> Self {
        Self::from_map(values)
    }
}

impl FromIterator<(String, Value)> for RuntimeContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
