//! In-process response cache standing in for the managed API cache.
//!
//! Entries are keyed per resolver by the values of its caching key
//! expressions. Eviction requests are matched against the same canonical
//! key, so an instruction that names a key differently from the resolver's
//! caching config silently misses.

use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use moka::{Expiry, future::Cache};
use serde_json::Value;

use crate::{
    domain::KeyArguments,
    forwarder::{EvictionError, EvictionPrimitive},
};

mod diag;
mod key;

pub use diag::{Diag, DiagSnapshot};
pub use key::{CachingConfig, key_name};

use key::{ResolverId, entry_key};

#[derive(Clone)]
struct CachedEntry {
    value: Arc<Value>,
    ttl: Duration,
}

struct ResolverTtl;

impl Expiry<String, CachedEntry> for ResolverTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedEntry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

pub struct ResponseCache {
    entries: Cache<String, CachedEntry>,
    resolvers: HashMap<ResolverId, CachingConfig>,
    diag: Diag,
}

impl ResponseCache {
    pub fn new(max_capacity: u64) -> Self {
        Self {
            entries: Cache::builder()
                .max_capacity(max_capacity)
                .expire_after(ResolverTtl)
                .build(),
            resolvers: HashMap::new(),
            diag: Diag::default(),
        }
    }

    /// Enables caching for a resolver
    pub fn with_resolver(
        mut self,
        operation_type: &str,
        field_name: &str,
        config: CachingConfig,
    ) -> Self {
        self.resolvers.insert(ResolverId::new(operation_type, field_name), config);
        self
    }

    pub fn caching_config_for(
        &self,
        operation_type: &str,
        field_name: &str,
    ) -> Option<&CachingConfig> {
        self.resolvers.get(&ResolverId::new(operation_type, field_name))
    }

    pub fn diag(&self) -> &Diag {
        &self.diag
    }

    pub async fn get(
        &self,
        operation_type: &str,
        field_name: &str,
        key_arguments: &KeyArguments,
    ) -> Option<Arc<Value>> {
        let key = entry_key(&ResolverId::new(operation_type, field_name), key_arguments);

        match self.entries.get(&key).await {
            Some(entry) => {
                self.diag.cache_hit();
                tracing::debug!(%key, "cache hit");
                Some(entry.value)
            }
            None => {
                self.diag.cache_miss();
                tracing::debug!(%key, "cache miss");
                None
            }
        }
    }

    /// Stores a resolver result. Resolvers without a caching config are not
    /// cached.
    pub async fn insert(
        &self,
        operation_type: &str,
        field_name: &str,
        key_arguments: &KeyArguments,
        value: Value,
    ) {
        let Some(config) = self.caching_config_for(operation_type, field_name) else {
            return;
        };

        let key = entry_key(&ResolverId::new(operation_type, field_name), key_arguments);
        let entry = CachedEntry {
            value: Arc::new(value),
            ttl: config.ttl,
        };

        self.entries.insert(key, entry).await;
    }

    /// Drops every entry
    pub fn flush(&self) {
        tracing::info!("flushing response cache");
        self.entries.invalidate_all();
    }
}

#[async_trait]
impl EvictionPrimitive for ResponseCache {
    async fn evict_from_api_cache(
        &self,
        operation_type: &str,
        field_name: &str,
        key_arguments: &KeyArguments,
    ) -> Result<(), EvictionError> {
        let id = ResolverId::new(operation_type, field_name);

        if !self.resolvers.contains_key(&id) {
            tracing::debug!(operation_type, field_name, "eviction for uncached resolver");
            return Ok(());
        }

        let key = entry_key(&id, key_arguments);
        if self.entries.remove(&key).await.is_some() {
            self.diag.eviction();
            tracing::debug!(%key, "cache entry evicted");
        } else {
            tracing::debug!(%key, "no cache entry to evict");
        }

        Ok(())
    }
}
