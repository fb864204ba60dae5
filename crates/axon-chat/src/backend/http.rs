//! HTTP backend client (Ollama-style `/api/chat` endpoint)

use async_trait::async_trait;
use axon_config::BackendConfig;
use axon_core::RequestContext;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Backend, BackendError, BackendReply, BackendRequest};

/// HTTP client for a plain chat backend
///
/// Speaks the non-streaming daemon protocol: one POST, one JSON reply
/// carrying the complete message text.
pub struct HttpBackend {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

/// Wire request body
#[derive(Debug, Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    stream: bool,
    options: WireOptions,
}

/// Flattened message for the tool-less backend
#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

/// Generation options understood by the daemon
#[derive(Debug, Serialize)]
struct WireOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

/// Wire reply body
#[derive(Debug, Deserialize)]
struct WireReply {
    message: WireReplyMessage,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireReplyMessage {
    #[serde(default)]
    content: String,
}

impl HttpBackend {
    /// Create from backend configuration
    #[must_use]
    pub fn new(name: String, config: &BackendConfig) -> Self {
        Self {
            name,
            client: Client::new(),
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Build the chat endpoint URL
    fn chat_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/api/chat")
    }
}

#[async_trait]
impl Backend for HttpBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(&self, request: &BackendRequest, _context: &RequestContext) -> Result<BackendReply, BackendError> {
        let body = WireRequest {
            model: &request.model,
            messages: request
                .messages
                .iter()
                .map(|m| WireMessage {
                    role: m.role.as_str(),
                    content: m.content.as_text(),
                })
                .collect(),
            stream: false,
            options: WireOptions {
                temperature: request.params.temperature,
                top_p: request.params.top_p,
                num_predict: request.params.max_tokens,
                stop: request.params.stop.clone(),
            },
        };

        let mut builder = self.client.post(self.chat_url()).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(backend = %self.name, error = %e, "backend request failed");
            BackendError::Transport(e.to_string())
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(1);
            return Err(BackendError::RateLimited { retry_after });
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(backend = %self.name, status = %status, "backend returned error");
            return Err(BackendError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let reply: WireReply = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidReply(e.to_string()))?;

        Ok(BackendReply {
            truncated: reply.done_reason.as_deref() == Some("length"),
            text: reply.message.content,
        })
    }
}
