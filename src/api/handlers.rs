use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    api::error::ApiError,
    app::{AppState, OperationRequest},
    cache::DiagSnapshot,
};

#[derive(Serialize, Deserialize)]
pub struct GraphqlResponse {
    pub data: Map<String, Value>,
}

impl IntoResponse for GraphqlResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

pub async fn graphql(
    State(app): State<AppState>,
    request: Result<Json<OperationRequest>, JsonRejection>,
) -> Result<GraphqlResponse, ApiError> {
    let Json(request) = request.map_err(|rejection| {
        tracing::warn!(cause = %rejection.body_text(), "malformed operation request");
        ApiError::bad_request(rejection.body_text())
    })?;
    let value = app.execute(&request).await?;

    let mut data = Map::new();
    data.insert(request.field, value);

    Ok(GraphqlResponse { data })
}

pub async fn flush_cache(State(app): State<AppState>) -> StatusCode {
    app.cache.flush();
    StatusCode::NO_CONTENT
}

pub async fn diagnostics(State(app): State<AppState>) -> Json<DiagSnapshot> {
    Json(app.cache.diag().snapshot())
}
