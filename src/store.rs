use async_trait::async_trait;
use dashmap::DashMap;
use thiserror::Error;

use crate::domain::{BowlId, Fruit};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table {0} is unavailable")]
    Unavailable(String),
    #[error("write to {table} rejected: {reason}")]
    Rejected { table: String, reason: String },
}

/// Key-value table backing the fruit resolvers
#[async_trait]
pub trait Table: Send + Sync {
    async fn put_item(&self, bowl_id: BowlId, fruit: Fruit) -> Result<(), StoreError>;

    async fn get_item(&self, bowl_id: BowlId) -> Result<Option<Fruit>, StoreError>;
}

#[derive(Default)]
pub struct MemoryTable {
    items: DashMap<BowlId, Fruit>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl Table for MemoryTable {
    async fn put_item(&self, bowl_id: BowlId, fruit: Fruit) -> Result<(), StoreError> {
        self.items.insert(bowl_id, fruit);
        Ok(())
    }

    async fn get_item(&self, bowl_id: BowlId) -> Result<Option<Fruit>, StoreError> {
        Ok(self.items.get(&bowl_id).map(|entry| entry.value().clone()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[tokio::test]
    async fn put_overwrites_previous_item() {
        let table = MemoryTable::new();
        let apple = Fruit {
            name: "apple".to_string(),
            count: 5,
        };
        let pear = Fruit {
            name: "pear".to_string(),
            count: 2,
        };

        table.put_item(BowlId(1), apple).await.unwrap();
        table.put_item(BowlId(1), pear.clone()).await.unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.get_item(BowlId(1)).await.unwrap(), Some(pear));
        assert_eq!(table.get_item(BowlId(2)).await.unwrap(), None);
    }
}
