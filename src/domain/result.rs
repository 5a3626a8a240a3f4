use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::EvictionBatch;

/// Reserved result field carrying the eviction batch from a mutation
/// resolver to its response handler. Never reaches the client.
pub const SENTINEL_FIELD: &str = "__evictions";

#[derive(Error, Debug)]
pub enum ResultError {
    #[error("result payload must be a JSON object")]
    NotAnObject,
    #[error("result payload already uses the reserved field __evictions")]
    ReservedField,
    #[error("failed to serialize result payload: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A resolver result as handed from the function to the response handler:
/// the payload fields plus, optionally, the sentinel field.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedResult {
    fields: Map<String, Value>,
}

/// A result with the sentinel field guaranteed absent.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedResult(Map<String, Value>);

impl AugmentedResult {
    pub fn new(payload: impl Serialize) -> Result<Self, ResultError> {
        let Value::Object(fields) = serde_json::to_value(payload)? else {
            return Err(ResultError::NotAnObject);
        };
        if fields.contains_key(SENTINEL_FIELD) {
            return Err(ResultError::ReservedField);
        }
        Ok(Self { fields })
    }

    /// Wraps whatever object the platform received, sentinel included.
    pub fn from_value(value: Value) -> Result<Self, ResultError> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(ResultError::NotAnObject),
        }
    }

    /// Attaches the batch. An empty batch leaves the sentinel out entirely.
    pub fn with_evictions(mut self, batch: EvictionBatch) -> Self {
        if batch.is_empty() {
            self.fields.remove(SENTINEL_FIELD);
        } else {
            self.fields.insert(SENTINEL_FIELD.to_string(), batch.encode());
        }
        self
    }

    pub fn sentinel(&self) -> Option<&Value> {
        self.fields.get(SENTINEL_FIELD)
    }

    /// Removes and returns the sentinel; the rest of the object is the
    /// cleaned result.
    pub(crate) fn split(mut self) -> (Option<Value>, CleanedResult) {
        let sentinel = self.fields.remove(SENTINEL_FIELD);
        (sentinel, CleanedResult(self.fields))
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl CleanedResult {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<CleanedResult> for AugmentedResult {
    fn from(result: CleanedResult) -> Self {
        Self { fields: result.0 }
    }
}
