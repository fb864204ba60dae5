use serde::Deserialize;

/// Tool registry configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    /// Register the built-in tool implementations at startup
    #[serde(default = "default_builtins")]
    pub builtins: bool,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self { builtins: true }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn default_builtins() -> bool {
    true
}
