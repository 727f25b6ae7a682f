/// `load_config` module: Loads a static YAML config, including environment secret injection, into [`AppConfig`].
///
/// # Responsibilities
/// - Parse the user-supplied YAML file into type-safe structs (every section optional)
/// - Inject secrets from the environment (`GITHUB_TOKEN`, `GEMINI_API_KEY`); they are never read from the file
/// - Produce clear diagnostics: any failure to read or parse is surfaced at the CLI boundary
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics.
///
/// Example file:
///
/// ```yaml
/// server:
///   host: 0.0.0.0
///   port: 5000
/// github:
///   api_base_url: https://api.github.com
/// gemini:
///   api_base_url: https://generativelanguage.googleapis.com/v1beta
///   default_model: gemini-1.5-flash
/// ```
use anyhow::Result;
use repo_grader_core::config::{GeminiConfig, GitHubConfig};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

pub const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub github: GitHubConfig,
    pub gemini: GeminiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl AppConfig {
    pub fn trace_loaded(&self) {
        info!(
            host = %self.server.host,
            port = self.server.port,
            "Loaded server config"
        );
        self.github.trace_loaded();
        self.gemini.trace_loaded();
    }
}

/// Loads a static YAML config file (no secrets) and injects secrets from the environment.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    // An empty file deserializes to unit, not a mapping.
    let mut config: AppConfig = if config_content.trim().is_empty() {
        AppConfig::default()
    } else {
        match serde_yaml::from_str(&config_content) {
            Ok(conf) => {
                info!(config_path = ?path_ref, "Parsed config YAML successfully");
                conf
            }
            Err(e) => {
                error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    inject_secrets(&mut config);
    Ok(config)
}

/// Built-in defaults plus environment secrets, used when no file is given.
pub fn default_config() -> AppConfig {
    info!("No config file given, using defaults");
    let mut config = AppConfig::default();
    inject_secrets(&mut config);
    config
}

/// Loads `path` when given, otherwise falls back to [`default_config`].
pub fn resolve_config(path: Option<&Path>) -> Result<AppConfig> {
    let config = match path {
        Some(path) => load_config(path)?,
        None => default_config(),
    };
    config.trace_loaded();
    Ok(config)
}

fn inject_secrets(config: &mut AppConfig) {
    config.github.token = secret(GITHUB_TOKEN_VAR);
    config.gemini.api_key = secret(GEMINI_API_KEY_VAR);
}

fn secret(var: &str) -> Option<String> {
    match std::env::var(var) {
        Ok(value) if !value.trim().is_empty() => {
            info!(var, "Secret found in env");
            Some(value)
        }
        _ => {
            warn!(var, "Secret not set in env");
            None
        }
    }
}
