//! Gemini model client and self-healing model discovery.
//!
//! The model used for generation lives in an [`ActiveModel`] handle owned by
//! whoever wires the pipeline together. [`discover_model`] asks the provider
//! which models exist and publishes a better choice through the matching
//! [`ActiveModelUpdater`]. Readers never wait for discovery: until it
//! publishes, they see the configured default.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::GeminiConfig;
use crate::contract::{ModelClient, ModelDescriptor};
use crate::error::ModelInvocationError;

const GENERATE_CONTENT: &str = "generateContent";
/// The key travels in a header so it never appears in request URLs or errors.
const API_KEY_HEADER: &str = "x-goog-api-key";
const PREFERRED_TIERS: [&str; 2] = ["flash", "pro"];

/// Read side of the active model identifier. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ActiveModel {
    current: watch::Receiver<String>,
}

/// Write side of the active model identifier, held by the discovery task.
#[derive(Debug)]
pub struct ActiveModelUpdater {
    current: watch::Sender<String>,
}

/// Creates a linked updater/handle pair starting at `default`.
pub fn active_model(default: impl Into<String>) -> (ActiveModelUpdater, ActiveModel) {
    let (tx, rx) = watch::channel(default.into());
    (ActiveModelUpdater { current: tx }, ActiveModel { current: rx })
}

impl ActiveModel {
    /// A handle that always reports `model`.
    pub fn fixed(model: impl Into<String>) -> Self {
        active_model(model).1
    }

    /// Identifier to use for the next request.
    pub fn current(&self) -> String {
        self.current.borrow().clone()
    }
}

impl ActiveModelUpdater {
    /// Publishes `model` to every handle. Requests already in flight keep the
    /// identifier they read.
    pub fn set(&self, model: impl Into<String>) {
        // send_replace never fails, even once every reader is gone.
        self.current.send_replace(model.into());
    }
}

/// First model that can generate content and belongs to a preferred tier,
/// with the `models/` prefix stripped.
pub fn select_model(models: &[ModelDescriptor]) -> Option<String> {
    models
        .iter()
        .find(|m| {
            m.supported_generation_methods
                .iter()
                .any(|method| method == GENERATE_CONTENT)
                && PREFERRED_TIERS.iter().any(|tier| m.name.contains(tier))
        })
        .map(|m| m.name.strip_prefix("models/").unwrap_or(&m.name).to_string())
}

/// Lists the provider's models and publishes the best match. Any failure
/// leaves the current model in place.
pub async fn discover_model<M>(client: &M, updater: &ActiveModelUpdater)
where
    M: ModelClient + ?Sized,
{
    let fallback = updater.current.borrow().clone();
    info!(default_model = %fallback, "[DISCOVERY] Detecting available models");

    match client.list_models().await {
        Ok(models) => match select_model(&models) {
            Some(model) => {
                info!(model = %model, candidates = models.len(), "[DISCOVERY] Selected model");
                updater.set(model);
            }
            None => {
                warn!(
                    candidates = models.len(),
                    default_model = %fallback,
                    "[DISCOVERY] No suitable model listed, keeping default"
                );
            }
        },
        Err(e) => {
            warn!(error = %e, default_model = %fallback, "[DISCOVERY] Model detection failed, keeping default");
        }
    }
}

/// Talks to the Gemini REST API.
pub struct GeminiClient {
    client: Client,
    api_base_url: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Self {
        if config.api_key.is_none() {
            warn!("[GEMINI] No API key configured, model calls will be rejected");
        }
        Self {
            client: Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone().unwrap_or_default(),
        }
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.api_base_url)
    }

    fn generate_url(&self, model: &str) -> String {
        format!("{}/models/{}:{}", self.api_base_url, model, GENERATE_CONTENT)
    }

    async fn check_status(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ModelInvocationError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        error!(status = %status, "[GEMINI] API error: {}", text);

        Err(match status {
            StatusCode::TOO_MANY_REQUESTS => ModelInvocationError::QuotaExceeded(text),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                ModelInvocationError::Authentication(text)
            }
            s if s.is_server_error() => ModelInvocationError::ServiceUnavailable(text),
            s => ModelInvocationError::UnexpectedStatus {
                status: s.as_u16(),
                body: text,
            },
        })
    }
}

#[async_trait]
impl ModelClient for GeminiClient {
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ModelInvocationError> {
        let response = self
            .client
            .get(self.models_url())
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await
            .map_err(ModelInvocationError::Transport)?;
        let response = Self::check_status(response).await?;
        let listing: GeminiModelList = response
            .json()
            .await
            .map_err(ModelInvocationError::Decode)?;

        Ok(listing
            .models
            .into_iter()
            .map(|m| ModelDescriptor {
                name: m.name,
                supported_generation_methods: m.supported_generation_methods,
            })
            .collect())
    }

    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ModelInvocationError> {
        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        debug!(model = model, prompt_chars = prompt.len(), "[GEMINI] Sending generateContent request");

        let response = self
            .client
            .post(self.generate_url(model))
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, model = model, "[GEMINI] Request failed");
                ModelInvocationError::Transport(e)
            })?;
        let response = Self::check_status(response).await?;
        let reply: GeminiResponse = response
            .json()
            .await
            .map_err(ModelInvocationError::Decode)?;

        let text = reply
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<String>()
            })
            .filter(|t| !t.trim().is_empty())
            .ok_or(ModelInvocationError::EmptyResponse)?;

        debug!(model = model, reply_chars = text.len(), "[GEMINI] Received reply");
        Ok(text)
    }
}

// === Gemini API Types ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModelList {
    #[serde(default)]
    models: Vec<GeminiModel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiModel {
    name: String,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockModelClient;

    fn descriptor(name: &str, methods: &[&str]) -> ModelDescriptor {
        ModelDescriptor {
            name: name.to_string(),
            supported_generation_methods: methods.iter().map(|m| m.to_string()).collect(),
        }
    }

    #[test]
    fn selects_first_generating_flash_or_pro_model() {
        let models = vec![
            descriptor("models/embedding-001", &["embedContent"]),
            descriptor("models/gemini-1.5-pro-vision", &["countTokens"]),
            descriptor("models/gemini-2.0-flash", &["generateContent", "countTokens"]),
            descriptor("models/gemini-1.5-pro", &["generateContent"]),
        ];
        assert_eq!(select_model(&models).as_deref(), Some("gemini-2.0-flash"));
    }

    #[test]
    fn selects_nothing_without_a_match() {
        let models = vec![
            descriptor("models/gemma-2b", &["generateContent"]),
            descriptor("models/embedding-001", &["embedContent"]),
        ];
        assert_eq!(select_model(&models), None);
        assert_eq!(select_model(&[]), None);
    }

    #[test]
    fn handles_observe_updates() {
        let (updater, handle) = active_model("gemini-1.5-flash");
        let other = handle.clone();
        assert_eq!(handle.current(), "gemini-1.5-flash");

        updater.set("gemini-2.0-pro");
        assert_eq!(handle.current(), "gemini-2.0-pro");
        assert_eq!(other.current(), "gemini-2.0-pro");
    }

    #[test]
    fn fixed_handle_keeps_its_model() {
        let handle = ActiveModel::fixed("gemini-test");
        assert_eq!(handle.current(), "gemini-test");
    }

    #[tokio::test]
    async fn discovery_publishes_selected_model() {
        let mut client = MockModelClient::new();
        client.expect_list_models().times(1).returning(|| {
            Ok(vec![descriptor("models/gemini-2.0-flash", &["generateContent"])])
        });

        let (updater, handle) = active_model("gemini-1.5-flash");
        discover_model(&client, &updater).await;
        assert_eq!(handle.current(), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn discovery_failure_keeps_default() {
        let mut client = MockModelClient::new();
        client
            .expect_list_models()
            .times(1)
            .returning(|| Err(ModelInvocationError::Authentication("bad key".to_string())));

        let (updater, handle) = active_model("gemini-1.5-flash");
        discover_model(&client, &updater).await;
        assert_eq!(handle.current(), "gemini-1.5-flash");
    }

    #[test]
    fn request_urls_carry_no_key() {
        let config = GeminiConfig {
            api_key: Some("test-key".to_string()),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config);
        let url = client.generate_url("gemini-2.0-flash");
        assert!(url.ends_with("/models/gemini-2.0-flash:generateContent"));
        assert!(!client.models_url().contains("test-key"));
    }

    #[tokio::test]
    async fn transport_error_does_not_reveal_key() {
        let config = GeminiConfig {
            api_base_url: "http://127.0.0.1:1".to_string(),
            api_key: Some("SUPER-SECRET-KEY".to_string()),
            ..GeminiConfig::default()
        };
        let client = GeminiClient::new(&config);

        let error = client.generate("m", "hi").await.unwrap_err();
        assert!(matches!(error, ModelInvocationError::Transport(_)));
        assert!(!error.to_string().contains("SUPER-SECRET-KEY"), "{error}");
        assert!(!format!("{error:?}").contains("SUPER-SECRET-KEY"));

        let error = client.list_models().await.unwrap_err();
        assert!(!format!("{error:?}").contains("SUPER-SECRET-KEY"));
    }
}
