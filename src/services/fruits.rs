use serde::Serialize;

use crate::{
    cache::key_name,
    domain::{
        AugmentedResult, BowlId, EvictionBatch, EvictionInstruction, Fruit, KeyArguments,
        PutFruitArgs,
    },
    services::ServiceError,
    store::Table,
};

/// Caching key the `Query.fruit` resolver is stored under.
pub const FRUIT_CACHING_KEY: &str = "$context.arguments.bowlId";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PutFruitPayload {
    pub bowl_id: BowlId,
    pub name: String,
    pub count: i64,
}

/// Eviction of the cached `Query.fruit` entry for a bowl
pub fn fruit_eviction(bowl_id: BowlId) -> EvictionInstruction {
    EvictionInstruction::new(
        "Query",
        "fruit",
        KeyArguments::new().with(key_name(FRUIT_CACHING_KEY), bowl_id.0),
    )
}

async fn write_fruit(
    args: &PutFruitArgs,
    table: &dyn Table,
) -> Result<AugmentedResult, ServiceError> {
    table.put_item(args.bowl_id, args.fruit()).await?;

    Ok(AugmentedResult::new(PutFruitPayload {
        bowl_id: args.bowl_id,
        name: args.name.clone(),
        count: args.count,
    })?)
}

/// Store a fruit in a bowl and ask for the bowl's cached query to be evicted
///
/// Nothing is returned, and so nothing is evicted, if the write fails
#[tracing::instrument(name = "services::put_fruit", skip(table))]
pub async fn put_fruit(
    args: &PutFruitArgs,
    table: &dyn Table,
) -> Result<AugmentedResult, ServiceError> {
    let result = write_fruit(args, table).await?;

    let mut batch = EvictionBatch::new();
    batch.push(fruit_eviction(args.bowl_id));

    tracing::debug!(evictions = batch.len(), "fruit stored");

    Ok(result.with_evictions(batch))
}

/// Store a fruit in a bowl, leaving any cached query untouched
#[tracing::instrument(name = "services::put_fruit_without_eviction", skip(table))]
pub async fn put_fruit_without_eviction(
    args: &PutFruitArgs,
    table: &dyn Table,
) -> Result<AugmentedResult, ServiceError> {
    write_fruit(args, table).await
}

/// Query fruit from the table
///
/// Returns Ok(None) if the bowl is empty
#[tracing::instrument(name = "services::get_fruit", skip(table))]
pub async fn get_fruit(bowl_id: BowlId, table: &dyn Table) -> Result<Option<Fruit>, ServiceError> {
    Ok(table.get_item(bowl_id).await?)
}
