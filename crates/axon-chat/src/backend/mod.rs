//! Backend trait and HTTP implementation
//!
//! The backend is a plain conversational service: it takes a message list
//! and returns complete free-form text. It knows nothing about tools;
//! that emulation happens above this boundary. Failures come back as a
//! typed classification so callers branch on kinds rather than matching
//! on message text.

pub mod http;

use async_trait::async_trait;
use axon_core::RequestContext;
use thiserror::Error;

use crate::types::{CompletionParams, Message};

/// Request forwarded to the backend after prompt compilation
#[derive(Debug, Clone)]
pub struct BackendRequest {
    /// Model identifier
    pub model: String,
    /// Messages, already flattened for a tool-less backend
    pub messages: Vec<Message>,
    /// Generation parameters
    pub params: CompletionParams,
}

/// Complete reply from the backend
#[derive(Debug, Clone)]
pub struct BackendReply {
    /// Full response text
    pub text: String,
    /// Whether generation stopped at the token limit
    pub truncated: bool,
}

/// Typed classification of backend failures
#[derive(Debug, Error)]
pub enum BackendError {
    /// Connection-level failure before any HTTP response
    #[error("backend transport error: {0}")]
    Transport(String),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {message}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// Backend rejected the call for rate-limit reasons
    #[error("backend rate limited, retry after {retry_after}s")]
    RateLimited {
        /// Seconds until the limit resets
        retry_after: u64,
    },

    /// Backend answered 2xx but the body was unreadable
    #[error("backend reply unreadable: {0}")]
    InvalidReply(String),
}

/// Trait implemented by conversational backends
#[async_trait]
pub trait Backend: Send + Sync {
    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Send a chat request and collect the complete reply
    async fn chat(&self, request: &BackendRequest, context: &RequestContext) -> Result<BackendReply, BackendError>;
}
