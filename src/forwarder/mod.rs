//! Response handlers that strip the eviction sentinel from a mutation
//! result and forward each instruction to the cache.
//!
//! Two handlers implement the same contract: [`TemplateForwarder`] walks
//! the raw result the way a mapping template does, [`ScriptForwarder`]
//! decodes typed instructions the way a resolver script does. Which one
//! runs is a deployment setting ([`ForwarderKind`]).

use std::{fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::domain::{AugmentedResult, CleanedResult, KeyArguments};

mod script;
mod template;

pub use script::ScriptForwarder;
pub use template::TemplateForwarder;

#[derive(Debug, Error)]
pub enum EvictionError {
    #[error("cache unreachable: {0}")]
    Unreachable(String),
}

/// The cache's eviction call
#[async_trait]
pub trait EvictionPrimitive: Send + Sync {
    async fn evict_from_api_cache(
        &self,
        operation_type: &str,
        field_name: &str,
        key_arguments: &KeyArguments,
    ) -> Result<(), EvictionError>;
}

#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Issues one eviction per instruction in the sentinel, in order, then
    /// returns the result without the sentinel. Eviction failures are
    /// logged and do not affect the returned result.
    async fn process_result(
        &self,
        result: AugmentedResult,
        evictor: &dyn EvictionPrimitive,
    ) -> CleanedResult;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForwarderKind {
    #[default]
    Template,
    Script,
}

#[derive(Debug, Error)]
#[error("unknown forwarder {0}, expected template or script")]
pub struct UnknownForwarder(String);

impl ForwarderKind {
    pub fn build(self) -> Arc<dyn Forwarder> {
        match self {
            Self::Template => Arc::new(TemplateForwarder),
            Self::Script => Arc::new(ScriptForwarder),
        }
    }
}

impl FromStr for ForwarderKind {
    type Err = UnknownForwarder;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "template" => Ok(Self::Template),
            "script" => Ok(Self::Script),
            _ => Err(UnknownForwarder(s.to_string())),
        }
    }
}

impl fmt::Display for ForwarderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template => write!(f, "template"),
            Self::Script => write!(f, "script"),
        }
    }
}

async fn forward(
    evictor: &dyn EvictionPrimitive,
    operation_type: &str,
    field_name: &str,
    key_arguments: &KeyArguments,
) {
    if let Err(e) = evictor
        .evict_from_api_cache(operation_type, field_name, key_arguments)
        .await
    {
        tracing::warn!(error = %e, operation_type, field_name, "cache eviction failed");
    }
}
