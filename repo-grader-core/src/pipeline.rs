//! High-level pipeline: orchestrates locate → fetch → prompt → model → normalize.
//!
//! This module provides the top-level orchestration for a single analysis
//! request. It runs a coordinated sequence that:
//!   - Resolves the repository URL into owner/name ([`crate::locator`])
//!   - Fetches repository metadata through a [`MetadataSource`]
//!   - Renders the evaluation prompt ([`crate::prompt`])
//!   - Submits it to the currently active model through a [`ModelClient`]
//!   - Parses and validates the reply ([`crate::normalize`])
//!
//! # Responsibilities
//! - Fail-fast orchestration: the first failing stage ends the live path
//! - Logging throughout, inside one `analysis` span per call
//! - Never surfaces a pipeline error: [`analyze`] replaces any failure with
//!   [`fallback::evaluation`]
//!
//! # Callable From
//! - The HTTP handler and the one-shot CLI command in the binary crate
//! - Integration tests, with mocked collaborators
//!
//! # Navigation
//! - Main entrypoint: [`analyze`]
//! - Error-preserving variant: [`try_analyze`]
//! - Supporting types: [`AnalysisRequest`], [`PipelineStage`]

use std::fmt;

use tracing::{debug, error, info, Instrument};
use uuid::Uuid;

use crate::contract::{MetadataSource, ModelClient};
use crate::error::{MissingInputError, PipelineError};
use crate::evaluation::EvaluationResult;
use crate::model::ActiveModel;
use crate::{fallback, locator, normalize, prompt};

/// One incoming analysis call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    repository_url: String,
}

impl AnalysisRequest {
    /// Rejects an absent or blank URL before the pipeline starts.
    pub fn new(repository_url: Option<String>) -> Result<Self, MissingInputError> {
        match repository_url {
            Some(url) if !url.trim().is_empty() => Ok(Self {
                repository_url: url,
            }),
            _ => Err(MissingInputError),
        }
    }

    pub fn repository_url(&self) -> &str {
        &self.repository_url
    }
}

/// States of the live path. Any failure leads to the fallback result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    ReferenceResolved,
    MetadataFetched,
    PromptBuilt,
    ModelInvoked,
    Normalized,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Start => "START",
            PipelineStage::ReferenceResolved => "REFERENCE_RESOLVED",
            PipelineStage::MetadataFetched => "METADATA_FETCHED",
            PipelineStage::PromptBuilt => "PROMPT_BUILT",
            PipelineStage::ModelInvoked => "MODEL_INVOKED",
            PipelineStage::Normalized => "NORMALIZED",
        };
        f.write_str(name)
    }
}

/// Runs the live path and returns the first failure.
pub async fn try_analyze<S, M>(
    request: &AnalysisRequest,
    source: &S,
    model: &M,
    active_model: &ActiveModel,
) -> Result<EvaluationResult, PipelineError>
where
    S: MetadataSource + ?Sized,
    M: ModelClient + ?Sized,
{
    debug!(stage = %PipelineStage::Start, "[ANALYZE] Resolving repository reference");
    let reference = locator::locate(request.repository_url())?;
    debug!(stage = %PipelineStage::ReferenceResolved, repository = %reference, "[ANALYZE] Fetching metadata");

    let metadata = source.fetch(&reference).await?;
    debug!(
        stage = %PipelineStage::MetadataFetched,
        files = metadata.file_names.len(),
        "[ANALYZE] Building prompt"
    );

    let prompt = prompt::build_prompt(&metadata);
    // Read once: a discovery update mid-request applies to the next request.
    let model_id = active_model.current();
    debug!(stage = %PipelineStage::PromptBuilt, model = %model_id, "[ANALYZE] Invoking model");

    let reply = model.generate(&model_id, &prompt).await?;
    debug!(stage = %PipelineStage::ModelInvoked, reply_chars = reply.len(), "[ANALYZE] Normalizing reply");

    let result = normalize::normalize(&reply)?;
    debug!(stage = %PipelineStage::Normalized, "[ANALYZE] Reply validated");

    Ok(result)
}

/// Entrypoint: always returns a schema-valid evaluation. Failures are logged
/// and replaced by the fallback result.
pub async fn analyze<S, M>(
    request: &AnalysisRequest,
    source: &S,
    model: &M,
    active_model: &ActiveModel,
) -> EvaluationResult
where
    S: MetadataSource + ?Sized,
    M: ModelClient + ?Sized,
{
    let analysis_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "analysis",
        %analysis_id,
        url = %request.repository_url()
    );

    async move {
        info!("[ANALYZE] Starting analysis");
        match try_analyze(request, source, model, active_model).await {
            Ok(result) => {
                info!(
                    score = result.evaluation_summary.score,
                    "[ANALYZE] Analysis complete"
                );
                result
            }
            Err(e) => {
                error!(
                    error = %e,
                    stage = %e.stage(),
                    "[ANALYZE][ERROR] Analysis failed, serving fallback result"
                );
                fallback::evaluation()
            }
        }
    }
    .instrument(span)
    .await
}
