use std::{sync::Arc, time::Duration};

use anyhow::Result;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::{
    api,
    cache::{CachingConfig, ResponseCache},
    config::Settings,
    domain::{AugmentedResult, FruitParseError, GetFruitArgs, PutFruitArgs},
    forwarder::Forwarder,
    services::{self, FRUIT_CACHING_KEY, ServiceError},
    store::{MemoryTable, Table},
};

#[derive(Clone)]
pub struct AppState {
    pub table: Arc<dyn Table>,
    pub cache: Arc<ResponseCache>,
    pub forwarder: Arc<dyn Forwarder>,
}

/// A single resolver invocation, e.g. `Query.fruit(bowlId: 1)`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    pub operation_type: String,
    pub field: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("no resolver for {0}.{1}")]
    UnknownField(String, String),
    #[error(transparent)]
    InvalidArguments(#[from] FruitParseError),
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl OperationRequest {
    pub fn new(operation_type: &str, field: &str, arguments: Value) -> Self {
        Self {
            operation_type: operation_type.to_string(),
            field: field.to_string(),
            arguments: match arguments {
                Value::Object(map) => map,
                _ => Map::new(),
            },
        }
    }

    /// Request context caching keys are resolved against
    fn context(&self) -> Value {
        json!({ "arguments": self.arguments })
    }
}

impl AppState {
    /// Runs the resolver named by the request and returns its result
    #[tracing::instrument(
        name = "app::execute",
        skip(self, request),
        fields(operation_type = %request.operation_type, field = %request.field)
    )]
    pub async fn execute(&self, request: &OperationRequest) -> Result<Value, AppError> {
        match (request.operation_type.as_str(), request.field.as_str()) {
            ("Query", "fruit") => self.query_fruit(request).await,
            ("Mutation", "putFruit") => {
                let args = PutFruitArgs::parse(&request.arguments)?;
                let result = services::put_fruit(&args, self.table.as_ref()).await?;
                Ok(self.forward(result).await)
            }
            ("Mutation", "putFruitWithoutEviction") => {
                let args = PutFruitArgs::parse(&request.arguments)?;
                let result =
                    services::put_fruit_without_eviction(&args, self.table.as_ref()).await?;
                Ok(self.forward(result).await)
            }
            (operation_type, field) => Err(AppError::UnknownField(
                operation_type.to_string(),
                field.to_string(),
            )),
        }
    }

    async fn forward(&self, result: AugmentedResult) -> Value {
        self.forwarder
            .process_result(result, self.cache.as_ref())
            .await
            .into_value()
    }

    async fn query_fruit(&self, request: &OperationRequest) -> Result<Value, AppError> {
        let args = GetFruitArgs::parse(&request.arguments)?;

        let key_arguments = self
            .cache
            .caching_config_for(&request.operation_type, &request.field)
            .map(|config| config.key_arguments(&request.context()));

        if let Some(keys) = &key_arguments {
            if let Some(cached) = self
                .cache
                .get(&request.operation_type, &request.field, keys)
                .await
            {
                return Ok(cached.as_ref().clone());
            }
        }

        let fruit = services::get_fruit(args.bowl_id, self.table.as_ref()).await?;
        let value = json!(fruit);

        if let Some(keys) = &key_arguments {
            self.cache
                .insert(&request.operation_type, &request.field, keys, value.clone())
                .await;
        }

        Ok(value)
    }
}

pub fn build_response_cache(settings: &Settings) -> ResponseCache {
    ResponseCache::new(settings.cache_max_capacity).with_resolver(
        "Query",
        "fruit",
        CachingConfig::new([FRUIT_CACHING_KEY], settings.cache_ttl),
    )
}

pub fn build_app_state(settings: &Settings, table: Arc<dyn Table>) -> AppState {
    tracing::info!(forwarder = %settings.forwarder, "building app state");

    AppState {
        table,
        cache: Arc::new(build_response_cache(settings)),
        forwarder: settings.forwarder.build(),
    }
}

/// logs cache efficiency at the given interval until cancelled
async fn log_diagnostics(cache: Arc<ResponseCache>, interval: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let snapshot = cache.diag().snapshot();
                tracing::info!(
                    "eff={}, cache_hits={}, cache_misses={}, evictions={}",
                    snapshot.efficiency(),
                    snapshot.hits,
                    snapshot.misses,
                    snapshot.evictions
                );
            }
        }
    }
}

pub async fn run(config: Settings) -> Result<()> {
    let state = build_app_state(&config, Arc::new(MemoryTable::new()));
    let router = api::build_router(state.clone());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("App running on {addr}");

    let cancel = CancellationToken::new();
    let diag_task = tokio::spawn(log_diagnostics(
        state.cache.clone(),
        config.diag_interval,
        cancel.clone(),
    ));

    let shutdown = cancel.clone();
    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "failed to listen for shutdown signal");
            }
            shutdown.cancel();
        })
        .await?;

    cancel.cancel();
    if let Err(e) = diag_task.await {
        tracing::error!(error = %e, "diagnostics task join error");
    }

    Ok(())
}
