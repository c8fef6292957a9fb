//! Data models shared across the scanner.
//!
//! Most of these mirror the JSON documents returned by the analysis
//! gateway. Unknown fields are kept in a flattened `extra` map so a result
//! can be handed back to the composite scorer exactly as it was received.

use crate::analysis::AnalysisSession;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Which analyses a run performs.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisMode {
    /// README, commit history and devlogs, combined into a composite score
    #[default]
    Repo,
    /// Source code only
    Code,
    /// Repo analysis followed by code analysis
    Both,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalysisMode::Repo => write!(f, "repo"),
            AnalysisMode::Code => write!(f, "code"),
            AnalysisMode::Both => write!(f, "both"),
        }
    }
}

impl AnalysisMode {
    pub fn includes_repo(&self) -> bool {
        matches!(self, AnalysisMode::Repo | AnalysisMode::Both)
    }

    pub fn includes_code(&self) -> bool {
        matches!(self, AnalysisMode::Code | AnalysisMode::Both)
    }
}

/// Links resolved from a Summer of Making project page.
///
/// Both fields are absent when resolution failed or the page has no repo.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SomProjectLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readme_link: Option<String>,
}

impl SomProjectLinks {
    pub fn is_empty(&self) -> bool {
        self.repo_link.is_none() && self.readme_link.is_none()
    }
}

/// README authenticity verdict.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadmeAnalysis {
    /// Probability (0-100) that the README was written by an AI.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complexity: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Commit history analysis for one repository.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitAnalysis {
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub repo: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub total_commits: u64,
    #[serde(default)]
    pub analysis: CommitVerdict,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The model's opinion of a commit history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommitVerdict {
    /// Likelihood (0-100) that commits were AI-generated.
    #[serde(default)]
    pub ai: f64,
    /// How well the history reflects real incremental work (0-100).
    #[serde(default)]
    pub adequacy: f64,
    /// Likelihood (0-100) of a padded or fabricated history.
    #[serde(default)]
    pub fraud: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub red_flags: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Devlog analysis for a Summer of Making project.
///
/// The gateway owns this shape; only the commonly rendered fields are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SomAnalysis {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Composite score returned by the gateway's scoring endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlopScoreResult {
    /// 0 (human) to 100 (slop).
    pub slopscore: f64,
    #[serde(default)]
    pub reasoning: String,
    #[serde(default)]
    pub main_factors: Vec<String>,
}

/// Source code analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysis {
    #[serde(default)]
    pub total_files_analyzed: u64,
    pub ai_analysis: CodeAiAnalysis,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAiAnalysis {
    pub analysis_results: CodeAnalysisResults,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeAnalysisResults {
    /// Probability (0-100) that the code is AI-generated.
    pub ai: f64,
    #[serde(default)]
    pub perfectness: f64,
    #[serde(default)]
    pub unused: f64,
    #[serde(default)]
    pub reasoning: String,
}

/// Body of `POST /repo-analysis`.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreRequest {
    pub readme_analysis: ReadmeAnalysis,
    pub repo_analysis: CommitAnalysis,
    pub som_analysis: Value,
}

/// `GET /health` response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub service: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

/// Human-readable bucket for a 0-100 slop score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Below 35
    LikelyHuman,
    /// 35 to 65
    Mixed,
    /// Above 65
    LikelyAi,
}

impl Verdict {
    pub fn from_score(score: f64) -> Self {
        if score < 35.0 {
            Verdict::LikelyHuman
        } else if score <= 65.0 {
            Verdict::Mixed
        } else {
            Verdict::LikelyAi
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Verdict::LikelyHuman => "🟢",
            Verdict::Mixed => "🟡",
            Verdict::LikelyAi => "🔴",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::LikelyHuman => write!(f, "Likely human"),
            Verdict::Mixed => write!(f, "Mixed"),
            Verdict::LikelyAi => write!(f, "Likely AI"),
        }
    }
}

/// Metadata about a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    /// URL the user asked about.
    pub source_url: String,
    pub mode: AnalysisMode,
    pub analysis_date: DateTime<Utc>,
    /// Base URL of the gateway that produced the results.
    pub gateway_url: String,
    pub duration_seconds: f64,
}

/// A complete slop report.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub session: AnalysisSession,
}
