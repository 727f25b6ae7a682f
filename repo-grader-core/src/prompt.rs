//! Evaluation prompt sent to the model.
//!
//! The template spells out the exact JSON document [`crate::normalize`]
//! expects back. The breakdown rows come from [`SCORE_AREAS`] so the prompt
//! and the validator cannot drift apart.

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::contract::RepositoryMetadata;
use crate::evaluation::SCORE_AREAS;

const PROMPT_TEMPLATE: &str = r#"Act as a strict technical recruiter reviewing a candidate's public repository.

Repository:
Name: {repo_name}
Description: {repo_description}
Files: {file_listing}

Return STRICT JSON only. Do not wrap it in Markdown code fences and do not add any text before or after it.
Use this EXACT structure:
{
    "evaluation_summary": {
        "score": <integer 0-100>,
        "skill_level": "Beginner" | "Intermediate" | "Advanced",
        "primary_stack": "<detected stack, comma separated>",
        "verdict": "<one-line professional judgment>"
    },
    "score_breakdown": [
{score_breakdown}
    ],
    "insights": {
        "total_files": <integer>,
        "readme_quality": "<string>",
        "test_files": "<string>",
        "commit_activity": "<string>"
    },
    "strengths": ["<strength 1>", "<strength 2>"],
    "critical_issues": [
        {
            "title": "<issue title>",
            "impact": "<why it matters>",
            "evidence": "<what was found>",
            "recommendation": "<how to fix>"
        }
    ],
    "roadmap": ["<immediate>", "<short-term>", "<advanced>"],
    "readiness": {
        "level": "Not Ready" | "Partially Ready" | "Strong",
        "gaps": ["<gap 1>", "<gap 2>"]
    }
}

Each score_breakdown score is an integer between 0 and its max. critical_issues may be an empty array."#;

/// Renders the evaluation prompt for `metadata`. Deterministic.
pub fn build_prompt(metadata: &RepositoryMetadata) -> String {
    let description = metadata
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("(none)");

    let rows = score_breakdown_rows();
    let listing = metadata.file_listing();

    // Single pass, so placeholder-looking text inside repository data stays literal.
    placeholder()
        .replace_all(PROMPT_TEMPLATE, |caps: &Captures<'_>| match &caps[1] {
            "repo_name" => metadata.name.clone(),
            "repo_description" => description.to_string(),
            "file_listing" => listing.clone(),
            _ => rows.clone(),
        })
        .into_owned()
}

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{(repo_name|repo_description|file_listing|score_breakdown)\}")
            .expect("static placeholder pattern compiles")
    })
}

fn score_breakdown_rows() -> String {
    SCORE_AREAS
        .iter()
        .map(|(area, max)| {
            format!("        {{ \"area\": \"{area}\", \"score\": <integer 0-{max}>, \"max\": {max} }}")
        })
        .collect::<Vec<_>>()
        .join(",\n")
}
