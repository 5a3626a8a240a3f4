use async_trait::async_trait;
use serde_json::Value;

use super::{EvictionPrimitive, Forwarder, forward};
use crate::domain::{AugmentedResult, CleanedResult, KeyArguments, is_scalar};

/// Walks the sentinel as raw JSON, checking each entry's shape inline.
pub struct TemplateForwarder;

#[async_trait]
impl Forwarder for TemplateForwarder {
    #[tracing::instrument(name = "forwarder::template", skip_all)]
    async fn process_result(
        &self,
        result: AugmentedResult,
        evictor: &dyn EvictionPrimitive,
    ) -> CleanedResult {
        let (sentinel, cleaned) = result.split();

        let entries = match sentinel {
            None | Some(Value::Null) => return cleaned,
            Some(Value::Array(entries)) => entries,
            Some(other) => {
                tracing::warn!(sentinel = %other, "eviction sentinel is not a list, ignoring");
                return cleaned;
            }
        };

        for entry in &entries {
            let Some([operation_type, field_name, key_arguments]) =
                entry.as_array().map(Vec::as_slice)
            else {
                tracing::warn!(%entry, "skipping malformed eviction entry");
                continue;
            };

            let (Some(operation_type), Some(field_name), Some(keys)) = (
                operation_type.as_str(),
                field_name.as_str(),
                key_arguments.as_object(),
            ) else {
                tracing::warn!(%entry, "skipping malformed eviction entry");
                continue;
            };

            if let Some((name, _)) = keys.iter().find(|(_, value)| !is_scalar(value)) {
                tracing::warn!(%entry, key = %name, "skipping eviction entry with non-scalar key");
                continue;
            }

            let key_arguments: KeyArguments = keys
                .iter()
                .map(|(name, value)| (name.clone(), value.clone()))
                .collect();

            forward(evictor, operation_type, field_name, &key_arguments).await;
        }

        cleaned
    }
}
