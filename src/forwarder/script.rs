use async_trait::async_trait;
use serde_json::Value;

use super::{EvictionPrimitive, Forwarder, forward};
use crate::domain::{AugmentedResult, CleanedResult, EvictionInstruction};

/// Decodes each sentinel entry into an [`EvictionInstruction`] before
/// forwarding it.
pub struct ScriptForwarder;

#[async_trait]
impl Forwarder for ScriptForwarder {
    #[tracing::instrument(name = "forwarder::script", skip_all)]
    async fn process_result(
        &self,
        result: AugmentedResult,
        evictor: &dyn EvictionPrimitive,
    ) -> CleanedResult {
        let (sentinel, cleaned) = result.split();

        let entries = match sentinel {
            Some(Value::Array(entries)) => entries,
            Some(Value::Null) | None => return cleaned,
            Some(other) => {
                tracing::warn!(sentinel = %other, "eviction sentinel is not a list, ignoring");
                return cleaned;
            }
        };

        let instructions = entries.iter().filter_map(|entry| {
            EvictionInstruction::decode(entry)
                .inspect_err(|e| tracing::warn!(error = %e, %entry, "skipping eviction entry"))
                .ok()
        });

        for instruction in instructions {
            forward(
                evictor,
                &instruction.operation_type,
                &instruction.field_name,
                &instruction.key_arguments,
            )
            .await;
        }

        cleaned
    }
}
