//! Slop score aggregation.
//!
//! There is no local scoring model. The composite score comes from the
//! gateway; this module only shapes its input and derives the code score.

use crate::analysis::session::AnalysisSession;
use crate::error::AnalysisError;
use crate::gateway::AnalysisGateway;
use crate::models::{
    CodeAnalysis, CommitAnalysis, ReadmeAnalysis, ScoreRequest, SlopScoreResult, SomAnalysis,
    Verdict,
};
use serde_json::{Map, Value};

/// Build the body for the composite scorer.
///
/// Without devlogs the SoM slot is an empty object, which the scorer
/// treats as "no devlog evidence".
pub fn score_request(
    readme: &ReadmeAnalysis,
    commits: &CommitAnalysis,
    som: Option<&SomAnalysis>,
) -> ScoreRequest {
    let som_analysis = som
        .and_then(|s| serde_json::to_value(s).ok())
        .unwrap_or_else(|| Value::Object(Map::new()));

    ScoreRequest {
        readme_analysis: readme.clone(),
        repo_analysis: commits.clone(),
        som_analysis,
    }
}

/// Ask the gateway for the composite slop score.
pub async fn compute_slop_score(
    gateway: &dyn AnalysisGateway,
    readme: &ReadmeAnalysis,
    commits: &CommitAnalysis,
    som: Option<&SomAnalysis>,
) -> Result<SlopScoreResult, AnalysisError> {
    gateway.score(&score_request(readme, commits, som)).await
}

/// Code-only score: the code model's AI probability, unchanged.
pub fn code_slop_score(code: &CodeAnalysis) -> SlopScoreResult {
    SlopScoreResult {
        slopscore: code.ai_analysis.analysis_results.ai,
        reasoning: code.ai_analysis.analysis_results.reasoning.clone(),
        main_factors: Vec::new(),
    }
}

/// One-line-per-section plain text summary for the terminal.
pub fn generate_summary_text(session: &AnalysisSession) -> String {
    let mut lines = Vec::new();

    let headline = session.slop_score().slopscore;
    let verdict = Verdict::from_score(headline);
    lines.push(format!(
        "Slop score: {:.0}/100 {} {}",
        headline,
        verdict.emoji(),
        verdict
    ));

    if let Some(repo) = session.repo() {
        if let Some(p) = repo.readme.probability {
            lines.push(format!("- README AI probability: {:.0}%", p));
        }
        lines.push(format!(
            "- Commits: {} analyzed, AI {:.0}%, fraud {:.0}%",
            repo.commits.total_commits, repo.commits.analysis.ai, repo.commits.analysis.fraud
        ));
        if let Some(ref som) = repo.som {
            match som.probability {
                Some(p) => lines.push(format!("- Devlogs AI probability: {:.0}%", p)),
                None => lines.push("- Devlogs analyzed".to_string()),
            }
        }
    }

    if let Some(code) = session.code() {
        lines.push(format!(
            "- Code: {} files, AI {:.0}%",
            code.code.total_files_analyzed, code.score.slopscore
        ));
    }

    lines.join("\n")
}

/// Red flags from the commit analysis followed by the scorer's main factors.
pub fn top_factors(session: &AnalysisSession, n: usize) -> Vec<String> {
    let mut factors: Vec<String> = Vec::new();

    if let Some(repo) = session.repo() {
        factors.extend(repo.score.main_factors.iter().cloned());
        factors.extend(repo.commits.analysis.red_flags.iter().cloned());
    }

    let mut seen = std::collections::HashSet::new();
    factors.retain(|f| seen.insert(f.to_lowercase()));
    factors.truncate(n);
    factors
}
