//! Turns a repository URL into a [`RepositoryReference`].

use std::sync::OnceLock;

use regex::Regex;

use crate::contract::RepositoryReference;
use crate::error::InvalidReferenceError;

fn github_path() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[/@.])github\.com/([A-Za-z0-9_.-]+)/([A-Za-z0-9_.-]+)(?:$|[/?#])")
            .expect("static repository pattern compiles")
    })
}

/// Path segments that would be rewritten by URL normalization are not names.
fn is_segment(part: &str) -> bool {
    !matches!(part, "" | "." | "..")
}

/// Extracts owner and name from `github.com/<owner>/<name>[...]`.
///
/// Anything after the name (`/tree/main`, query, fragment) is ignored and a
/// trailing `.git` is dropped.
pub fn locate(url: &str) -> Result<RepositoryReference, InvalidReferenceError> {
    let invalid = || InvalidReferenceError {
        url: url.to_string(),
    };

    let captures = github_path().captures(url.trim()).ok_or_else(invalid)?;
    let owner = &captures[1];
    let raw_name = &captures[2];
    let name = raw_name.strip_suffix(".git").unwrap_or(raw_name);

    if !is_segment(owner) || !is_segment(name) {
        return Err(invalid());
    }

    Ok(RepositoryReference {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
