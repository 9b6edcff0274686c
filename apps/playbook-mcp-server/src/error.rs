//! Error types for the MCP server

use thiserror::Error;

use playbook_core::PlaybookError;

/// Server-side errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Playbook not found: {0}")]
    PlaybookNotFound(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Protocol error: {0}")]
    ProtocolError(String),

    #[error("Playbook error: {0}")]
    Playbook(#[from] PlaybookError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

#[cfg(feature = "http")]
mod http_response {
    use axum::{
        extract::rejection::JsonRejection,
        http::StatusCode,
        response::{IntoResponse, Response},
        Json,
    };
    use serde_json::json;

    use super::ServerError;
    use playbook_core::PlaybookError;

    impl From<JsonRejection> for ServerError {
        fn from(rejection: JsonRejection) -> Self {
            ServerError::InvalidArgument(rejection.body_text())
        }
    }

    impl IntoResponse for ServerError {
        fn into_response(self) -> Response {
            let (status, code) = match &self {
                ServerError::PlaybookNotFound(_) | ServerError::ResourceNotFound(_) => {
                    (StatusCode::NOT_FOUND, "NOT_FOUND")
                }
                ServerError::InvalidArgument(_)
                | ServerError::UnknownTool(_)
                | ServerError::ProtocolError(_)
                | ServerError::JsonError(_)
                | ServerError::Playbook(PlaybookError::InvalidQuery(_)) => {
                    (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
                }
                ServerError::Playbook(_) | ServerError::IoError(_) => {
                    tracing::error!("Internal error: {}", self);
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            };

            let body = Json(json!({
                "success": false,
                "error": self.to_string(),
                "code": code,
            }));

            (status, body).into_response()
        }
    }
}
