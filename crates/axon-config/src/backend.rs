use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Default backend base URL (local Ollama-style daemon)
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:11434";

/// Configuration for the upstream conversational backend
///
/// The backend speaks plain chat: it accepts a message list and returns
/// free-form text. It has no native tool-calling support; Axon layers
/// that on top.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Base URL of the backend HTTP API
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Optional bearer token for the backend
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Models advertised via `/v1/models`; the first entry is used when a
    /// request names a model the backend does not recognize
    #[serde(default)]
    pub models: Vec<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            models: Vec::new(),
        }
    }
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("valid default URL")
}
