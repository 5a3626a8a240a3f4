use axum::{
    Router,
    routing::{delete, get, post},
};
use tower_http::trace::TraceLayer;

use crate::{api::handlers, app::AppState};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/graphql", post(handlers::graphql))
        .route("/cache", delete(handlers::flush_cache))
        .route("/diag", get(handlers::diagnostics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
