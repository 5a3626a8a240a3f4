use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use resolver_evict::{
    app::{self, AppState},
    config::Settings,
    domain::{BowlId, Fruit, KeyArguments},
    forwarder::{EvictionError, EvictionPrimitive, ForwarderKind},
    store::{MemoryTable, StoreError, Table},
};

pub const KINDS: [ForwarderKind; 2] = [ForwarderKind::Template, ForwarderKind::Script];

pub type Call = (String, String, KeyArguments);

/// Records every eviction call, optionally failing each one
#[derive(Default)]
pub struct RecordingEvictor {
    calls: Mutex<Vec<Call>>,
    fail: bool,
}

impl RecordingEvictor {
    pub fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl EvictionPrimitive for RecordingEvictor {
    async fn evict_from_api_cache(
        &self,
        operation_type: &str,
        field_name: &str,
        key_arguments: &KeyArguments,
    ) -> Result<(), EvictionError> {
        self.calls.lock().unwrap().push((
            operation_type.to_string(),
            field_name.to_string(),
            key_arguments.clone(),
        ));

        if self.fail {
            return Err(EvictionError::Unreachable("simulated outage".to_string()));
        }
        Ok(())
    }
}

/// Table whose writes can be switched off; reads keep working
#[derive(Default)]
pub struct FlakyTable {
    inner: MemoryTable,
    fail_writes: Mutex<bool>,
}

impl FlakyTable {
    pub fn set_fail_writes(&self, fail: bool) {
        *self.fail_writes.lock().unwrap() = fail;
    }
}

#[async_trait]
impl Table for FlakyTable {
    async fn put_item(&self, bowl_id: BowlId, fruit: Fruit) -> Result<(), StoreError> {
        let fail = *self.fail_writes.lock().unwrap();
        if fail {
            return Err(StoreError::Rejected {
                table: "fruits".to_string(),
                reason: "simulated write failure".to_string(),
            });
        }
        self.inner.put_item(bowl_id, fruit).await
    }

    async fn get_item(&self, bowl_id: BowlId) -> Result<Option<Fruit>, StoreError> {
        self.inner.get_item(bowl_id).await
    }
}

pub fn settings(forwarder: ForwarderKind) -> Settings {
    Settings {
        forwarder,
        ..Settings::default()
    }
}

pub fn state(forwarder: ForwarderKind) -> AppState {
    app::build_app_state(&settings(forwarder), Arc::new(MemoryTable::new()))
}
