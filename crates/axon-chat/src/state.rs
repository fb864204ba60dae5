//! Core chat state and the completion flow

use std::pin::Pin;
use std::sync::Arc;

use axon_core::RequestContext;
use axon_ratelimit::RateLimitMonitor;
use axon_tools::ToolRegistry;
use futures_util::Stream;

use crate::backend::{Backend, BackendRequest, http::HttpBackend};
use crate::emulation::{assemble, extract, fallback, prompt};
use crate::error::ChatError;
use crate::types::{CompletionRequest, CompletionResponse, StreamEvent, ToolCall, ToolResult};
use crate::{usage, validate};

/// Shared state for the chat completion flow
///
/// Owns the backend, the tool registry, and the optional backend-call
/// monitor. Everything else is request-scoped.
#[derive(Clone)]
pub struct ChatState {
    inner: Arc<ChatStateInner>,
}

struct ChatStateInner {
    backend: Arc<dyn Backend>,
    registry: ToolRegistry,
    monitor: Option<RateLimitMonitor>,
    models: Vec<String>,
}

impl ChatState {
    /// Create state around an arbitrary backend
    #[must_use]
    pub fn new(
        backend: Arc<dyn Backend>,
        registry: ToolRegistry,
        monitor: Option<RateLimitMonitor>,
        models: Vec<String>,
    ) -> Self {
        Self {
            inner: Arc::new(ChatStateInner {
                backend,
                registry,
                monitor,
                models,
            }),
        }
    }

    /// Build state from configuration with the HTTP backend
    ///
    /// # Errors
    ///
    /// Returns an error if the backend monitor configuration is invalid
    pub fn from_config(config: &axon_config::Config) -> anyhow::Result<Self> {
        let backend = Arc::new(HttpBackend::new("backend".to_owned(), &config.backend));

        let registry = if config.tools.builtins {
            ToolRegistry::with_builtins()
        } else {
            ToolRegistry::new()
        };

        let monitor = config
            .server
            .rate_limit
            .as_ref()
            .map(axon_ratelimit::create_backend_monitor)
            .transpose()?
            .flatten();

        Ok(Self::new(backend, registry, monitor, config.backend.models.clone()))
    }

    /// Models advertised by this gateway
    #[must_use]
    pub fn models(&self) -> &[String] {
        &self.inner.models
    }

    /// The process-wide tool registry
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.inner.registry
    }

    /// Execute a non-streaming completion
    ///
    /// # Errors
    ///
    /// Returns an error for invalid requests, or for backend failures
    /// that the active tool-choice policy does not allow recovering from
    pub async fn complete(
        &self,
        request: CompletionRequest,
        context: RequestContext,
    ) -> Result<CompletionResponse, ChatError> {
        let outcome = self.run_exchange(&request, &context).await?;
        let (message, finish_reason) = assemble::assemble_message(outcome.text, outcome.tool_calls, outcome.truncated);
        let usage = usage::estimate(&outcome.prompt_messages, &message);

        Ok(assemble::completion_response(&outcome.model, message, finish_reason, usage))
    }

    /// Execute a streaming completion
    ///
    /// The backend produces complete text; the returned stream is the
    /// finished response re-chunked into ordered synthetic deltas.
    /// Dropping the stream mid-way simply stops emission.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`complete`](Self::complete); errors are
    /// reported before the stream starts
    pub async fn complete_stream(
        &self,
        request: CompletionRequest,
        context: RequestContext,
    ) -> Result<(String, Pin<Box<dyn Stream<Item = Result<StreamEvent, ChatError>> + Send>>), ChatError> {
        let outcome = self.run_exchange(&request, &context).await?;
        let (message, finish_reason) = assemble::assemble_message(outcome.text, outcome.tool_calls, outcome.truncated);

        let events = assemble::stream_events(&message, finish_reason);
        let stream = futures_util::stream::iter(events.into_iter().map(Ok));

        Ok((outcome.model, Box::pin(stream)))
    }

    /// Run registered implementations for the given tool calls
    ///
    /// Calls execute concurrently and independently; each result is
    /// correlated to its call by id, never by position. Execution never
    /// fails: every failure mode lands in the result payload.
    pub async fn execute_tool_calls(&self, calls: &[ToolCall]) -> Vec<ToolResult> {
        let executions = calls.iter().map(|call| async {
            let content =
                axon_tools::execute_function(&self.inner.registry, &call.function.name, &call.function.arguments).await;
            ToolResult {
                tool_call_id: call.id.clone(),
                content,
            }
        });

        futures_util::future::join_all(executions).await
    }

    /// Shared request flow: validate, compile, call the backend, extract
    /// calls, and apply the tool-choice policy
    async fn run_exchange(
        &self,
        request: &CompletionRequest,
        context: &RequestContext,
    ) -> Result<ExchangeOutcome, ChatError> {
        validate::validate_request(request)?;

        let model = self.resolve_model(&request.model);
        let tools = request.tool_slice();
        let tool_choice = request.tool_choice.as_ref();
        let mandatory = tool_choice.is_some_and(crate::types::ToolChoice::is_mandatory);

        let prompt_messages = prompt::compile_messages(&request.messages, tools, tool_choice);
        let backend_request = BackendRequest {
            model: model.clone(),
            messages: prompt_messages.clone(),
            params: request.params.clone(),
        };

        if let Some(monitor) = &self.inner.monitor {
            let utilization = monitor.utilization();
            if let Some(wait) = monitor.recommended_wait() {
                tracing::warn!(utilization, wait_secs = wait.as_secs(), "backend budget exhausted");
            } else {
                tracing::debug!(utilization, "backend budget");
            }
            monitor.record();
        }

        let (text, truncated, extracted) = match self.inner.backend.chat(&backend_request, context).await {
            Ok(reply) => {
                let calls = if tools.is_empty() {
                    Vec::new()
                } else {
                    extract::extract_tool_calls(&reply.text)
                };
                (reply.text, reply.truncated, calls)
            }
            Err(e) if mandatory => {
                // A mandatory tool choice is a response contract; the
                // fallback below satisfies it instead of surfacing the
                // backend failure.
                tracing::warn!(error = %e, "backend failed under mandatory tool choice, synthesizing");
                (String::new(), false, Vec::new())
            }
            Err(e) => return Err(e.into()),
        };

        let tool_calls = match tool_choice {
            Some(choice) if choice.forbids_calls() => Vec::new(),
            Some(choice) if choice.is_mandatory() && extracted.is_empty() => {
                fallback::synthesize_tool_call(tools, choice, request.latest_user_text().as_deref())
                    .into_iter()
                    .collect()
            }
            _ => extracted,
        };

        // Tool-call replies must not leak their JSON rendering as content
        let text = if tool_calls.is_empty() { text } else { String::new() };

        Ok(ExchangeOutcome {
            model,
            prompt_messages,
            text,
            truncated,
            tool_calls,
        })
    }

    /// Map the requested model onto an advertised one
    fn resolve_model(&self, requested: &str) -> String {
        if self.inner.models.iter().any(|m| m == requested) {
            requested.to_owned()
        } else {
            let fallback = self.inner.models.first().cloned().unwrap_or_else(|| requested.to_owned());
            tracing::debug!(requested, resolved = %fallback, "model not advertised, using default");
            fallback
        }
    }
}

/// Everything the assemblers need from one backend exchange
struct ExchangeOutcome {
    model: String,
    prompt_messages: Vec<crate::types::Message>,
    text: String,
    truncated: bool,
    tool_calls: Vec<ToolCall>,
}
