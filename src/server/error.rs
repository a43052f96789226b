use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::chef::{ChefError, ValidationError};
use crate::schema::Operation;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("{0}")]
    Validation(ValidationError),

    #[error("{}", .operation.failure_message())]
    Failed {
        operation: Operation,
        #[source]
        source: ChefError,
    },
}

impl AppError {
    pub fn from_chef(operation: Operation, err: ChefError) -> Self {
        match err {
            ChefError::Validation(validation) => AppError::Validation(validation),
            other => AppError::Failed {
                operation,
                source: other,
            },
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::MalformedPayload(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::MalformedPayload(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Failed { operation, source } => {
                error!(%operation, cause = %source, "operation failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
