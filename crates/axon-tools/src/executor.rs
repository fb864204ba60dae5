use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use serde_json::{Value, json};

use crate::registry::ToolRegistry;

/// Execute a named function against the registry, yielding a string payload
///
/// This function is total: unknown names, malformed arguments, handler
/// errors, and handler panics all resolve to an `{"error": ...}` payload
/// instead of propagating. String results are returned verbatim; any
/// other JSON value is re-encoded.
pub async fn execute_function(registry: &ToolRegistry, name: &str, arguments: &str) -> String {
    let Some(handler) = registry.get(name) else {
        return json!({ "error": format!("Function '{name}' not found") }).to_string();
    };

    // An empty arguments payload means "no arguments"
    let parsed: Value = if arguments.trim().is_empty() {
        Value::Object(serde_json::Map::new())
    } else {
        match serde_json::from_str(arguments) {
            Ok(value) => value,
            Err(e) => {
                return json!({ "error": format!("Error executing function: {e}") }).to_string();
            }
        }
    };

    match AssertUnwindSafe(handler.invoke(parsed)).catch_unwind().await {
        Ok(Ok(Value::String(text))) => text,
        Ok(Ok(value)) => value.to_string(),
        Ok(Err(e)) => json!({ "error": e.to_string() }).to_string(),
        Err(_) => {
            tracing::warn!(tool = name, "tool implementation panicked");
            json!({ "error": "Unknown error" }).to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::*;
    use crate::registry::{ToolError, ToolHandler};

    struct Failing;

    #[async_trait]
    impl ToolHandler for Failing {
        async fn invoke(&self, _arguments: Value) -> Result<Value, ToolError> {
            Err(ToolError::new("disk on fire"))
        }
    }

    struct Panicking;

    #[async_trait]
    impl ToolHandler for Panicking {
        async fn invoke(&self, _arguments: Value) -> Result<Value, ToolError> {
            panic!("not an error value");
        }
    }

    struct Structured;

    #[async_trait]
    impl ToolHandler for Structured {
        async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
            Ok(json!({ "echo": arguments }))
        }
    }

    struct Verbatim;

    #[async_trait]
    impl ToolHandler for Verbatim {
        async fn invoke(&self, _arguments: Value) -> Result<Value, ToolError> {
            Ok(Value::String("already a string".to_string()))
        }
    }

    #[tokio::test]
    async fn unknown_function_reports_not_found() {
        let registry = ToolRegistry::new();
        let payload = execute_function(&registry, "nope", "{}").await;
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["error"], "Function 'nope' not found");
    }

    #[tokio::test]
    async fn invalid_arguments_report_execution_error() {
        let registry = ToolRegistry::new();
        registry.register("echo", Arc::new(Structured));
        let payload = execute_function(&registry, "echo", "{not json").await;
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert!(
            parsed["error"]
                .as_str()
                .unwrap()
                .starts_with("Error executing function:")
        );
    }

    #[tokio::test]
    async fn handler_error_message_is_captured() {
        let registry = ToolRegistry::new();
        registry.register("fail", Arc::new(Failing));
        let payload = execute_function(&registry, "fail", "{}").await;
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["error"], "disk on fire");
    }

    #[tokio::test]
    async fn handler_panic_becomes_unknown_error() {
        let registry = ToolRegistry::new();
        registry.register("boom", Arc::new(Panicking));
        let payload = execute_function(&registry, "boom", "{}").await;
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["error"], "Unknown error");
    }

    #[tokio::test]
    async fn string_results_pass_through_verbatim() {
        let registry = ToolRegistry::new();
        registry.register("verbatim", Arc::new(Verbatim));
        let payload = execute_function(&registry, "verbatim", "{}").await;
        assert_eq!(payload, "already a string");
    }

    #[tokio::test]
    async fn structured_results_are_json_encoded() {
        let registry = ToolRegistry::new();
        registry.register("echo", Arc::new(Structured));
        let payload = execute_function(&registry, "echo", r#"{"a":1}"#).await;
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert_eq!(parsed["echo"]["a"], 1);
    }

    #[tokio::test]
    async fn empty_arguments_mean_no_arguments() {
        let registry = ToolRegistry::new();
        registry.register("echo", Arc::new(Structured));
        let payload = execute_function(&registry, "echo", "").await;
        let parsed: Value = serde_json::from_str(&payload).unwrap();
        assert!(parsed["echo"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_executions_do_not_cross_talk() {
        let registry = ToolRegistry::new();
        registry.register("echo", Arc::new(Structured));

        let (a, b) = tokio::join!(
            execute_function(&registry, "echo", r#"{"id":"first"}"#),
            execute_function(&registry, "echo", r#"{"id":"second"}"#),
        );

        let a: Value = serde_json::from_str(&a).unwrap();
        let b: Value = serde_json::from_str(&b).unwrap();
        assert_eq!(a["echo"]["id"], "first");
        assert_eq!(b["echo"]["id"], "second");
    }
}
