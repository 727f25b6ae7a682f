use serde::{Deserialize, Serialize};
use tracing::info;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// Hosting provider settings. The token is injected from the environment,
/// never read from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base_url: String,
    #[serde(skip)]
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_GITHUB_API_URL.to_string(),
            token: None,
        }
    }
}

impl GitHubConfig {
    pub fn trace_loaded(&self) {
        info!(
            api_base_url = %self.api_base_url,
            token_set = self.token.is_some(),
            "Loaded GitHub config"
        );
    }
}

/// Model provider settings. The API key is injected from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    pub api_base_url: String,
    /// Used until model discovery picks something better, and kept if it fails.
    pub default_model: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_GEMINI_API_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            api_key: None,
        }
    }
}

impl GeminiConfig {
    pub fn trace_loaded(&self) {
        info!(
            api_base_url = %self.api_base_url,
            default_model = %self.default_model,
            api_key_set = self.api_key.is_some(),
            "Loaded Gemini config"
        );
    }
}
