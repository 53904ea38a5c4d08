//! Form parameter builder for multipart uploads.
//!
//! JSON requests skip empty fields through serde attributes. Multipart
//! requests need flat `key=value` text parts instead, so this builder
//! collects values, drops nulls and empty strings, and renders nested
//! values (reply markup, reply parameters) as JSON text.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::trace;

/// Collects request parameters, skipping empty values.
#[derive(Debug, Clone, Default)]
pub struct ParamBuilder {
    params: Map<String, Value>,
}

impl ParamBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from every field of a serializable request record.
    ///
    /// Non-object values produce an empty builder.
    pub fn from_request<T: Serialize>(request: &T) -> Result<Self, serde_json::Error> {
        let mut builder = Self::new();
        if let Value::Object(map) = serde_json::to_value(request)? {
            for (key, value) in map {
                builder.insert(key, value);
            }
        }
        Ok(builder)
    }

    /// Add a value. Nulls and empty strings are skipped; values that cannot
    /// be represented as JSON are skipped too.
    pub fn add(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let key = key.into();
        match serde_json::to_value(value) {
            Ok(value) => self.insert(key, value),
            Err(e) => trace!("Skipping {}: {}", key, e),
        }
        self
    }

    /// Drop a key, e.g. the field that is sent as a file part instead.
    pub fn remove(mut self, key: &str) -> Self {
        self.params.remove(key);
        self
    }

    fn insert(&mut self, key: String, value: Value) {
        match &value {
            Value::Null => trace!("Skipping {}: null", key),
            Value::String(s) if s.is_empty() => trace!("Skipping {}: empty string", key),
            _ => {
                self.params.insert(key, value);
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.params.contains_key(key)
    }

    /// The collected parameters as a JSON object.
    pub fn build(self) -> Map<String, Value> {
        self.params
    }

    /// The collected parameters as multipart text fields.
    ///
    /// Strings are sent verbatim, everything else as its JSON encoding.
    pub fn into_form_fields(self) -> Vec<(String, String)> {
        self.params
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect()
    }
}
