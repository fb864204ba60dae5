//! Current-time tool

use async_trait::async_trait;
use jiff::Timestamp;
use serde_json::Value;

use crate::registry::{ToolError, ToolHandler};

/// Reports the current time, optionally in a named IANA timezone
pub struct CurrentTime;

#[async_trait]
impl ToolHandler for CurrentTime {
    async fn invoke(&self, arguments: Value) -> Result<Value, ToolError> {
        let now = Timestamp::now();

        let rendered = match arguments.get("timezone").and_then(Value::as_str) {
            Some(name) => now
                .in_tz(name)
                .map_err(|e| ToolError::new(format!("unknown timezone '{name}': {e}")))?
                .to_string(),
            None => now.to_string(),
        };

        Ok(Value::String(rendered))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn default_is_utc_instant() {
        let result = CurrentTime.invoke(json!({})).await.unwrap();
        let text = result.as_str().unwrap();
        assert!(text.ends_with('Z'), "expected UTC instant, got {text}");
    }

    #[tokio::test]
    async fn named_timezone_is_applied() {
        let result = CurrentTime.invoke(json!({"timezone": "America/New_York"})).await.unwrap();
        assert!(result.as_str().unwrap().contains("America/New_York"));
    }

    #[tokio::test]
    async fn bogus_timezone_is_an_error() {
        let err = CurrentTime.invoke(json!({"timezone": "Nowhere/Void"})).await.unwrap_err();
        assert!(err.to_string().contains("Nowhere/Void"));
    }
}
