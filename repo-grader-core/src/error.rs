//! Error taxonomy for the analysis pipeline.
//!
//! Every stage has its own error type so failures stay distinguishable in the
//! logs, even though the orchestrator replaces all of them with the fallback
//! result. [`MissingInputError`] is the only error a caller ever sees.

use thiserror::Error;

use crate::pipeline::PipelineStage;

/// The caller supplied no repository URL at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("URL is required")]
pub struct MissingInputError;

/// The URL does not match a recognized hosting path shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("not a recognized GitHub repository URL: {url}")]
pub struct InvalidReferenceError {
    pub url: String,
}

/// The hosting API could not produce repository metadata.
#[derive(Debug, Error)]
pub enum MetadataFetchError {
    #[error("repository not found or private: {owner}/{name}")]
    NotFound { owner: String, name: String },

    #[error("GitHub rejected the access token")]
    Unauthorized,

    #[error("GitHub refused access: {0}")]
    Forbidden(String),

    #[error("GitHub rate limit exhausted")]
    RateLimited,

    #[error("GitHub returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("GitHub request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("could not decode GitHub response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// The generative-model provider call failed.
#[derive(Debug, Error)]
pub enum ModelInvocationError {
    #[error("model quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("model provider authentication failed: {0}")]
    Authentication(String),

    #[error("model provider unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("model provider returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("model request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("could not decode model response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// The model's reply could not be turned into an evaluation.
#[derive(Debug, Error)]
pub enum SchemaParseError {
    #[error("model reply is not a valid evaluation document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("model reply violates the evaluation schema: {0}")]
    Invalid(String),
}

/// Any failure inside the pipeline. Never leaves the orchestrator.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidReference(#[from] InvalidReferenceError),

    #[error(transparent)]
    MetadataFetch(#[from] MetadataFetchError),

    #[error(transparent)]
    ModelInvocation(#[from] ModelInvocationError),

    #[error(transparent)]
    SchemaParse(#[from] SchemaParseError),
}

impl PipelineError {
    /// Last stage the pipeline completed before this error occurred.
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::InvalidReference(_) => PipelineStage::Start,
            PipelineError::MetadataFetch(_) => PipelineStage::ReferenceResolved,
            PipelineError::ModelInvocation(_) => PipelineStage::PromptBuilt,
            PipelineError::SchemaParse(_) => PipelineStage::ModelInvoked,
        }
    }
}
