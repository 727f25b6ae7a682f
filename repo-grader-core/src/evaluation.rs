//! The evaluation document handed to the presentation layer.
//!
//! Field names on the wire are snake_case. Whatever path produced it (model
//! reply or fallback), a value of [`EvaluationResult`] always carries every
//! field, and [`EvaluationResult::validate`] checks the numeric invariants the
//! report relies on.

use serde::{Deserialize, Serialize};

use crate::error::SchemaParseError;

/// Breakdown areas in report order with their maximum score. Maxima sum to 100.
pub const SCORE_AREAS: [(&str, u32); 6] = [
    ("Code Quality", 20),
    ("Project Structure", 15),
    ("Documentation", 15),
    ("Testing", 15),
    ("Commit History", 20),
    ("Applicability", 15),
];

/// Highest overall score.
pub const MAX_SCORE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub evaluation_summary: EvaluationSummary,
    pub score_breakdown: Vec<ScoreArea>,
    pub insights: Insights,
    pub strengths: Vec<String>,
    pub critical_issues: Vec<CriticalIssue>,
    pub roadmap: Vec<String>,
    pub readiness: Readiness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub score: u32,
    pub skill_level: SkillLevel,
    /// Comma-separated stack tokens, e.g. "Rust, Tokio, Axum".
    pub primary_stack: String,
    pub verdict: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkillLevel {
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreArea {
    pub area: String,
    pub score: u32,
    pub max: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insights {
    pub total_files: u32,
    pub readme_quality: String,
    pub test_files: String,
    pub commit_activity: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalIssue {
    pub title: String,
    pub impact: String,
    pub evidence: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Readiness {
    pub level: ReadinessLevel,
    pub gaps: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReadinessLevel {
    #[serde(rename = "Not Ready", alias = "NotReady")]
    NotReady,
    #[serde(rename = "Partially Ready", alias = "PartiallyReady")]
    PartiallyReady,
    Strong,
}

impl EvaluationResult {
    /// Checks the numeric invariants: overall score within range, every area
    /// score within its maximum, and area maxima adding up to [`MAX_SCORE`].
    pub fn validate(&self) -> Result<(), SchemaParseError> {
        let score = self.evaluation_summary.score;
        if score > MAX_SCORE {
            return Err(SchemaParseError::Invalid(format!(
                "evaluation_summary.score {score} exceeds {MAX_SCORE}"
            )));
        }

        if let Some(area) = self.score_breakdown.iter().find(|a| a.score > a.max) {
            return Err(SchemaParseError::Invalid(format!(
                "score_breakdown area '{}' scores {} over its max {}",
                area.area, area.score, area.max
            )));
        }

        let total_max: u32 = self.score_breakdown.iter().map(|a| a.max).sum();
        if total_max != MAX_SCORE {
            return Err(SchemaParseError::Invalid(format!(
                "score_breakdown maxima sum to {total_max}, expected {MAX_SCORE}"
            )));
        }

        Ok(())
    }
}
