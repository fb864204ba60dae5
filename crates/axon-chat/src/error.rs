use axon_core::HttpError;
use http::StatusCode;
use thiserror::Error;

use crate::backend::BackendError;

/// Errors that can surface from the chat completion flow
///
/// Parse failures on backend text never appear here; they are recovered
/// inside the extraction layer. Tool execution failures are captured into
/// tool-result payloads. What remains is what the caller can actually act
/// on.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Client sent a structurally invalid request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The upstream backend call failed and no policy allowed recovery
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl HttpError for ChatError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Backend(e) => match e {
                BackendError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
                BackendError::Transport(_) | BackendError::Upstream { .. } | BackendError::InvalidReply(_) => {
                    StatusCode::BAD_GATEWAY
                }
            },
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Backend(e) => match e {
                BackendError::RateLimited { .. } => "rate_limit_error",
                _ => "upstream_error",
            },
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}
