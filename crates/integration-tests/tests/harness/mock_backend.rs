//! Mock text backend for integration tests
//!
//! Implements the minimal daemon chat API: one POST, one JSON reply with
//! complete message text. Supports canned replies, failure injection,
//! and capture of the last request body so tests can inspect what the
//! gateway actually sent.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Json, Router, routing};
use tokio_util::sync::CancellationToken;

/// Mock backend that returns predictable replies
pub struct MockBackend {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockBackendState>,
}

struct MockBackendState {
    chat_count: AtomicU32,
    /// Number of requests to fail with 500 before succeeding (u32::MAX = always)
    fail_count: AtomicU32,
    /// Reply content returned by the chat endpoint
    reply_content: String,
    /// `done_reason` reported with the reply
    done_reason: String,
    /// Body of the most recent chat request
    last_request: Mutex<Option<serde_json::Value>>,
}

impl MockBackend {
    /// Start a mock replying with the given text
    pub async fn start(reply_content: &str) -> anyhow::Result<Self> {
        Self::start_inner(reply_content, "stop", 0).await
    }

    /// Start a mock whose reply is reported as truncated
    pub async fn start_truncated(reply_content: &str) -> anyhow::Result<Self> {
        Self::start_inner(reply_content, "length", 0).await
    }

    /// Start a mock that fails every chat request with 500
    pub async fn start_failing() -> anyhow::Result<Self> {
        Self::start_inner("", "stop", u32::MAX).await
    }

    async fn start_inner(reply_content: &str, done_reason: &str, fail_count: u32) -> anyhow::Result<Self> {
        let state = Arc::new(MockBackendState {
            chat_count: AtomicU32::new(0),
            fail_count: AtomicU32::new(fail_count),
            reply_content: reply_content.to_owned(),
            done_reason: done_reason.to_owned(),
            last_request: Mutex::new(None),
        });

        let app = Router::new()
            .route("/api/chat", routing::post(handle_chat))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL for configuring the mock as the backend
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Number of chat requests received
    pub fn chat_count(&self) -> u32 {
        self.state.chat_count.load(Ordering::Relaxed)
    }

    /// Body of the most recent chat request, if any
    pub fn last_request(&self) -> Option<serde_json::Value> {
        self.state.last_request.lock().unwrap().clone()
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_chat(
    State(state): State<Arc<MockBackendState>>,
    Json(body): Json<serde_json::Value>,
) -> impl IntoResponse {
    state.chat_count.fetch_add(1, Ordering::Relaxed);
    *state.last_request.lock().unwrap() = Some(body);

    let remaining = state.fail_count.load(Ordering::Relaxed);
    if remaining > 0 {
        if remaining != u32::MAX {
            state.fail_count.store(remaining - 1, Ordering::Relaxed);
        }
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": "mock backend unavailable" })),
        )
            .into_response();
    }

    let reply = serde_json::json!({
        "message": { "role": "assistant", "content": state.reply_content },
        "done": true,
        "done_reason": state.done_reason,
    });

    Json(reply).into_response()
}
