use std::time::Duration;

use serde_json::Value;

use crate::domain::KeyArguments;

/// Per-resolver caching configuration: which parts of the request context
/// make up the cache key, and how long entries live.
#[derive(Debug, Clone, PartialEq)]
pub struct CachingConfig {
    pub keys: Vec<String>,
    pub ttl: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ResolverId {
    pub operation_type: String,
    pub field_name: String,
}

impl ResolverId {
    pub fn new(operation_type: &str, field_name: &str) -> Self {
        Self {
            operation_type: operation_type.to_string(),
            field_name: field_name.to_string(),
        }
    }
}

impl CachingConfig {
    pub fn new<I, S>(keys: I, ttl: Duration) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            ttl,
        }
    }

    /// Resolves every caching key expression against the request context.
    pub fn key_arguments(&self, context: &Value) -> KeyArguments {
        self.keys
            .iter()
            .map(|expr| (key_name(expr).to_string(), resolve(expr, context)))
            .collect()
    }
}

/// Name under which an expression's value is keyed, and which eviction
/// instructions must use: the expression without its leading `$`.
pub fn key_name(expr: &str) -> &str {
    expr.trim_start_matches('$')
}

/// Walks `$context.a.b` (or `$ctx.a.b`) through the context object.
/// Unknown roots and missing segments resolve to null.
fn resolve(expr: &str, context: &Value) -> Value {
    let mut segments = key_name(expr).split('.');

    match segments.next() {
        Some("context" | "ctx") => {}
        _ => return Value::Null,
    }

    segments
        .try_fold(context, |value, segment| value.get(segment))
        .cloned()
        .unwrap_or(Value::Null)
}

/// Canonical cache entry key: the JSON text of
/// `[operationType, fieldName, {keyArguments}]`. Key names and values are
/// quoted and escaped, so distinct key arguments never collide.
pub(crate) fn entry_key(id: &ResolverId, key_arguments: &KeyArguments) -> String {
    let keys = key_arguments
        .iter()
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    Value::Array(vec![
        Value::String(id.operation_type.clone()),
        Value::String(id.field_name.clone()),
        Value::Object(keys),
    ])
    .to_string()
}
