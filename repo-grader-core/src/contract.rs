//! # contract: seams between the pipeline and its remote collaborators
//!
//! This module defines the two traits the orchestrator is wired through and
//! the plain data types that cross them:
//!
//! - [`MetadataSource`] fetches repository metadata from a hosting provider
//!   (GitHub in production, see [`crate::metadata::GitHubClient`]).
//! - [`ModelClient`] lists available generative models and submits prompts
//!   (Gemini in production, see [`crate::model::GeminiClient`]).
//!
//! ## Mocking & Testing
//! Both traits are annotated for `mockall`. With the `test-export-mocks`
//! feature (on by default) the generated `MockMetadataSource` and
//! `MockModelClient` are available to downstream crates and integration tests.

use async_trait::async_trait;
#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::{MetadataFetchError, ModelInvocationError};

/// Owner and repository name, both non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryReference {
    pub owner: String,
    pub name: String,
}

impl std::fmt::Display for RepositoryReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// What the pipeline knows about a repository when it builds the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryMetadata {
    pub name: String,
    pub description: Option<String>,
    /// Top-level entry names in listing order.
    pub file_names: Vec<String>,
}

impl RepositoryMetadata {
    /// Top-level entries joined into the single string embedded in the prompt.
    pub fn file_listing(&self) -> String {
        self.file_names.join(", ")
    }
}

/// One entry of the model provider's model listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    /// Provider name, e.g. `models/gemini-1.5-flash`.
    pub name: String,
    pub supported_generation_methods: Vec<String>,
}

/// Source of repository metadata.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch descriptor and top-level listing. Both must succeed.
    async fn fetch(
        &self,
        reference: &RepositoryReference,
    ) -> Result<RepositoryMetadata, MetadataFetchError>;
}

/// Generative-model provider.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// List the models the configured credential can see.
    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, ModelInvocationError>;

    /// Submit `prompt` to `model` and return the raw reply text.
    async fn generate(&self, model: &str, prompt: &str) -> Result<String, ModelInvocationError>;
}
