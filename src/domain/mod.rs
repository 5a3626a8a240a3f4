mod eviction;
mod fruit;
mod result;

pub use eviction::{DecodeError, EvictionBatch, EvictionInstruction, KeyArguments};
pub(crate) use eviction::is_scalar;
pub use fruit::{BowlId, Fruit, FruitParseError, GetFruitArgs, PutFruitArgs};
pub use result::{AugmentedResult, CleanedResult, ResultError, SENTINEL_FIELD};
