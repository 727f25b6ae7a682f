//! Static evaluation served whenever the live pipeline fails.
//!
//! Must stay in lockstep with [`crate::evaluation`]: the value returned here
//! has to pass [`EvaluationResult::validate`].

use crate::evaluation::{
    CriticalIssue, EvaluationResult, EvaluationSummary, Insights, Readiness, ReadinessLevel,
    ScoreArea, SkillLevel,
};

/// Overall score of the fallback evaluation.
pub const FALLBACK_SCORE: u32 = 72;

pub fn evaluation() -> EvaluationResult {
    EvaluationResult {
        evaluation_summary: EvaluationSummary {
            score: FALLBACK_SCORE,
            skill_level: SkillLevel::Intermediate,
            primary_stack: "JavaScript, React, Node.js".to_string(),
            verdict: "Good foundation, but lacks production readiness due to missing tests and documentation.".to_string(),
        },
        score_breakdown: vec![
            area("Code Quality & Readability", 14, 20),
            area("Project Structure", 12, 15),
            area("Documentation", 5, 15),
            area("Testing & Maintainability", 2, 15),
            area("Commit History", 15, 20),
            area("Real-World Applicability", 10, 15),
        ],
        insights: Insights {
            total_files: 15,
            readme_quality: "Basic / Minimal".to_string(),
            test_files: "None detected".to_string(),
            commit_activity: "Moderate (Last commit 2 months ago)".to_string(),
        },
        strengths: strings(&[
            "Clean folder organization",
            "Meaningful project idea",
            "Uses modern ES6+ syntax",
        ]),
        critical_issues: vec![
            CriticalIssue {
                title: "Missing Documentation".to_string(),
                impact: "Recruiters cannot understand how to run or assess your code.".to_string(),
                evidence: "README.md is empty or missing setup instructions.".to_string(),
                recommendation: "Add a standard README with Installation, Usage, and Features sections.".to_string(),
            },
            CriticalIssue {
                title: "No Automated Tests".to_string(),
                impact: "Indicates code is fragile and hard to maintain.".to_string(),
                evidence: "No test folder or *.test.js files found.".to_string(),
                recommendation: "Add simple unit tests using Jest or Mocha.".to_string(),
            },
        ],
        roadmap: strings(&[
            "Immediate: Write a README.md",
            "Short-Term: Add basic error handling in API routes",
            "Advanced: Set up GitHub Actions for CI/CD",
        ]),
        readiness: Readiness {
            level: ReadinessLevel::PartiallyReady,
            gaps: strings(&["No Documentation", "No Testing"]),
        },
    }
}

fn area(name: &str, score: u32, max: u32) -> ScoreArea {
    ScoreArea {
        area: name.to_string(),
        score,
        max,
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
