use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use thiserror::Error;

/// Failure reported by a tool implementation
///
/// The message is captured into the executor's `{"error": ...}` payload;
/// it never propagates as a Rust error past the executor.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ToolError {
    message: String,
}

impl ToolError {
    /// Create an error carrying the given message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A callable tool implementation
///
/// Handlers receive parsed JSON arguments and return a JSON value.
/// String results are passed to the caller verbatim; any other value is
/// JSON-encoded by the executor.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Run the tool against the given arguments
    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError>;
}

/// Registry of tool implementations keyed by function name
///
/// Owned by one service instance rather than living in a process global,
/// so concurrent instances (e.g. in tests) do not interfere. Reads are
/// lock-free and safe while executions are in flight; mutation happens
/// only through explicit [`register`](Self::register) calls.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: Arc<DashMap<String, Arc<dyn ToolHandler>>>,
}

impl ToolRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the built-in tools
    #[must_use]
    pub fn with_builtins() -> Self {
        let registry = Self::new();
        crate::builtin::register_all(&registry);
        registry
    }

    /// Register (or replace) a tool implementation
    pub fn register(&self, name: impl Into<String>, handler: Arc<dyn ToolHandler>) {
        let name = name.into();
        tracing::debug!(tool = %name, "registering tool implementation");
        self.handlers.insert(name, handler);
    }

    /// Look up an implementation by function name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn ToolHandler>> {
        self.handlers.get(name).map(|entry| Arc::clone(entry.value()))
    }

    /// Names of all registered tools
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        self.handlers.iter().map(|entry| entry.key().clone()).collect()
    }
}
