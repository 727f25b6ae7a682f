//! GitHub REST client behind [`MetadataSource`].
//!
//! A fetch issues the repository descriptor and root contents requests
//! together and stops at the first failure. HTTP statuses map onto
//! [`MetadataFetchError`] variants.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, error, info, warn};

use crate::config::GitHubConfig;
use crate::contract::{MetadataSource, RepositoryMetadata, RepositoryReference};
use crate::error::MetadataFetchError;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const CLIENT_USER_AGENT: &str = concat!("repo-grader/", env!("CARGO_PKG_VERSION"));

/// Repository descriptor, `GET /repos/{owner}/{repo}`.
#[derive(Debug, Deserialize)]
struct RepoDescriptor {
    name: String,
    description: Option<String>,
}

/// One entry of `GET /repos/{owner}/{repo}/contents`.
#[derive(Debug, Deserialize)]
struct ContentEntry {
    name: String,
}

/// Reads repository metadata from the GitHub REST API.
pub struct GitHubClient {
    client: Client,
    api_base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Self {
        if config.token.is_none() {
            warn!("[GITHUB] No access token configured, requests are unauthenticated");
        }
        Self {
            client: Client::new(),
            api_base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(CLIENT_USER_AGENT));
        if let Some(token) = &self.token {
            match HeaderValue::from_str(&format!("Bearer {token}")) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(e) => {
                    error!(error = ?e, "[GITHUB] Access token is not a valid header value, sending unauthenticated");
                }
            }
        }
        headers
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        reference: &RepositoryReference,
    ) -> Result<T, MetadataFetchError> {
        debug!(url = %url, "[GITHUB] GET");
        let response = self
            .client
            .get(url)
            .headers(self.headers())
            .send()
            .await
            .map_err(|e| {
                error!(error = ?e, url = %url, "[GITHUB] Request failed");
                MetadataFetchError::Transport(e)
            })?;

        let response = check_status(response, reference).await?;
        response.json::<T>().await.map_err(|e| {
            error!(error = ?e, url = %url, "[GITHUB] Failed to decode response body");
            MetadataFetchError::Decode(e)
        })
    }
}

/// Maps a non-success GitHub response to the matching error.
async fn check_status(
    response: Response,
    reference: &RepositoryReference,
) -> Result<Response, MetadataFetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let rate_limit_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);
    let body = response.text().await.unwrap_or_default();

    error!(
        status = %status,
        repository = %reference,
        "[GITHUB] API returned error. Response body: {body}"
    );

    Err(match status {
        StatusCode::NOT_FOUND => MetadataFetchError::NotFound {
            owner: reference.owner.clone(),
            name: reference.name.clone(),
        },
        StatusCode::UNAUTHORIZED => MetadataFetchError::Unauthorized,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS if rate_limit_exhausted => {
            MetadataFetchError::RateLimited
        }
        StatusCode::FORBIDDEN => MetadataFetchError::Forbidden(body),
        other => MetadataFetchError::UnexpectedStatus {
            status: other.as_u16(),
            body,
        },
    })
}

#[async_trait]
impl MetadataSource for GitHubClient {
    async fn fetch(
        &self,
        reference: &RepositoryReference,
    ) -> Result<RepositoryMetadata, MetadataFetchError> {
        let repo_url = format!(
            "{}/repos/{}/{}",
            self.api_base_url, reference.owner, reference.name
        );
        let contents_url = format!("{repo_url}/contents");

        // Fail fast: the first error drops the other request.
        let (descriptor, entries) = futures::try_join!(
            self.get_json::<RepoDescriptor>(&repo_url, reference),
            self.get_json::<Vec<ContentEntry>>(&contents_url, reference),
        )?;

        info!(
            repository = %reference,
            files = entries.len(),
            "[GITHUB] Fetched repository metadata"
        );

        Ok(RepositoryMetadata {
            name: descriptor.name,
            description: descriptor.description,
            file_names: entries.into_iter().map(|e| e.name).collect(),
        })
    }
}
