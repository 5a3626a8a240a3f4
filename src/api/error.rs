use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{app::AppError, services::ServiceError};

pub struct ApiError {
    status_code: StatusCode,
    reason: String,
}

#[derive(Serialize)]
struct ApiErrorBody {
    errors: [ErrorEntry; 1],
}

#[derive(Serialize)]
struct ErrorEntry {
    message: String,
}

impl ApiError {
    pub fn public(status_code: StatusCode, reason: impl Into<String>) -> Self {
        Self {
            status_code,
            reason: reason.into(),
        }
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::public(StatusCode::BAD_REQUEST, reason)
    }

    pub fn internal() -> Self {
        Self::public(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::UnknownField(..) | AppError::InvalidArguments(_) => {
                tracing::warn!(cause = %error, "rejected operation");
                Self::bad_request(error.to_string())
            }
            AppError::Service(ServiceError::Store(e)) => {
                tracing::error!(error = %e, "store error");
                Self::internal()
            }
            AppError::Service(e) => {
                tracing::error!(error = %e, "resolver error");
                Self::internal()
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiErrorBody {
            errors: [ErrorEntry {
                message: self.reason,
            }],
        };
        (self.status_code, Json(body)).into_response()
    }
}
