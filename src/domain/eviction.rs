use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_json::Value;
use thiserror::Error;

/// Values of the caching keys an entry was stored under, keyed by the
/// caching key expression without its leading `$`
/// (e.g. `context.arguments.bowlId`).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyArguments(BTreeMap<String, Value>);

/// One `(operationType, fieldName, keyArguments)` entry to drop from the
/// response cache.
#[derive(Debug, Clone, PartialEq)]
pub struct EvictionInstruction {
    pub operation_type: String,
    pub field_name: String,
    pub key_arguments: KeyArguments,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EvictionBatch(Vec<EvictionInstruction>);

#[derive(Error, Debug, PartialEq)]
pub enum DecodeError {
    #[error("eviction batch is not an array")]
    NotAnArray,
    #[error("eviction instruction is not an [operationType, fieldName, keyArguments] tuple")]
    NotATuple,
    #[error("key argument {0} is not a scalar")]
    NonScalarKey(String),
}

pub(crate) fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Array(_) | Value::Object(_))
}

impl KeyArguments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a key argument. Non-scalar values never match a stored key, so
    /// callers should only pass strings, numbers, booleans or null.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Value)> for KeyArguments {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'de> Deserialize<'de> for KeyArguments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, Value>::deserialize(deserializer)?;
        if let Some((name, _)) = map.iter().find(|(_, v)| !is_scalar(v)) {
            return Err(de::Error::custom(DecodeError::NonScalarKey(name.clone())));
        }
        Ok(Self(map))
    }
}

impl EvictionInstruction {
    pub fn new(
        operation_type: impl Into<String>,
        field_name: impl Into<String>,
        key_arguments: KeyArguments,
    ) -> Self {
        Self {
            operation_type: operation_type.into(),
            field_name: field_name.into(),
            key_arguments,
        }
    }

    /// Decodes a single `[operationType, fieldName, keyArguments]` tuple.
    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        let Value::Array(parts) = value else {
            return Err(DecodeError::NotATuple);
        };

        let [Value::String(operation_type), Value::String(field_name), Value::Object(keys)] =
            parts.as_slice()
        else {
            return Err(DecodeError::NotATuple);
        };

        let key_arguments = keys
            .iter()
            .map(|(name, value)| {
                if is_scalar(value) {
                    Ok((name.clone(), value.clone()))
                } else {
                    Err(DecodeError::NonScalarKey(name.clone()))
                }
            })
            .collect::<Result<KeyArguments, _>>()?;

        Ok(Self::new(
            operation_type.clone(),
            field_name.clone(),
            key_arguments,
        ))
    }
}

impl Serialize for EvictionInstruction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        (&self.operation_type, &self.field_name, &self.key_arguments).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for EvictionInstruction {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let (operation_type, field_name, key_arguments) =
            <(String, String, KeyArguments)>::deserialize(deserializer)?;
        Ok(Self {
            operation_type,
            field_name,
            key_arguments,
        })
    }
}

impl EvictionBatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, instruction: EvictionInstruction) {
        self.0.push(instruction);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EvictionInstruction> {
        self.0.iter()
    }

    /// Wire form: a JSON array of instruction tuples.
    pub fn encode(&self) -> Value {
        Value::Array(
            self.0
                .iter()
                .map(|i| {
                    Value::Array(vec![
                        Value::String(i.operation_type.clone()),
                        Value::String(i.field_name.clone()),
                        Value::Object(
                            i.key_arguments
                                .iter()
                                .map(|(k, v)| (k.clone(), v.clone()))
                                .collect(),
                        ),
                    ])
                })
                .collect(),
        )
    }

    pub fn decode(value: &Value) -> Result<Self, DecodeError> {
        let Value::Array(entries) = value else {
            return Err(DecodeError::NotAnArray);
        };

        entries
            .iter()
            .map(EvictionInstruction::decode)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl From<Vec<EvictionInstruction>> for EvictionBatch {
    fn from(instructions: Vec<EvictionInstruction>) -> Self {
        Self(instructions)
    }
}

impl IntoIterator for EvictionBatch {
    type Item = EvictionInstruction;
    type IntoIter = std::vec::IntoIter<EvictionInstruction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
