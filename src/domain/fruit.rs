use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BowlId(pub i64);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fruit {
    pub name: String,
    pub count: i64,
}

#[derive(Error, Debug)]
pub enum FruitParseError {
    #[error("fruit name is empty")]
    EmptyName,
    #[error("fruit count is negative")]
    NegativeCount,
    #[error("invalid arguments: {0}")]
    InvalidArguments(#[from] serde_json::Error),
}

/// Arguments of the `putFruit` mutations.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutFruitArgs {
    pub bowl_id: BowlId,
    pub name: String,
    pub count: i64,
}

/// Arguments of the `fruit` query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFruitArgs {
    pub bowl_id: BowlId,
}

impl PutFruitArgs {
    pub fn parse(arguments: &Map<String, Value>) -> Result<Self, FruitParseError> {
        let args: Self = serde_json::from_value(Value::Object(arguments.clone()))?;
        if args.name.trim().is_empty() {
            return Err(FruitParseError::EmptyName);
        }
        if args.count < 0 {
            return Err(FruitParseError::NegativeCount);
        }
        Ok(args)
    }

    pub fn fruit(&self) -> Fruit {
        Fruit {
            name: self.name.clone(),
            count: self.count,
        }
    }
}

impl GetFruitArgs {
    pub fn parse(arguments: &Map<String, Value>) -> Result<Self, FruitParseError> {
        Ok(serde_json::from_value(Value::Object(arguments.clone()))?)
    }
}
