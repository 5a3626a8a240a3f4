use thiserror::Error;

use crate::{domain::ResultError, store::StoreError};

mod fruits;

pub use fruits::*;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("store error {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Result(#[from] ResultError),
}
