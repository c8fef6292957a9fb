//! The result of one analysis run.
//!
//! Which sections exist is decided by the variant, not by flags: a
//! `Code` session has no commit analysis to misread, a `Repo` session for
//! a GitHub URL has no devlog analysis. Repo findings are assembled through
//! a staged builder where every stage consumes the previous one, so a
//! half-finished set of findings can never escape a failed run.

use crate::analysis::aggregator;
use crate::models::{
    AnalysisMode, CodeAnalysis, CommitAnalysis, ReadmeAnalysis, SlopScoreResult, SomAnalysis,
    SomProjectLinks,
};
use serde::Serialize;

/// Findings from the README, commit history and (for SoM projects) devlogs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoFindings {
    pub links: SomProjectLinks,
    pub readme: ReadmeAnalysis,
    pub commits: CommitAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub som: Option<SomAnalysis>,
    /// Composite score from the gateway.
    pub score: SlopScoreResult,
}

/// Findings from the source code analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodeFindings {
    /// Repository URL the code analysis was requested for.
    pub repo_url: String,
    pub code: CodeAnalysis,
    /// Copy of the code model's AI probability.
    pub score: SlopScoreResult,
}

impl CodeFindings {
    pub fn new(repo_url: impl Into<String>, code: CodeAnalysis) -> Self {
        let score = aggregator::code_slop_score(&code);
        Self {
            repo_url: repo_url.into(),
            code,
            score,
        }
    }
}

/// A finished run, shaped by the requested mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum AnalysisSession {
    Repo(RepoFindings),
    Code(CodeFindings),
    Both {
        repo: RepoFindings,
        code: CodeFindings,
    },
}

impl AnalysisSession {
    pub fn mode(&self) -> AnalysisMode {
        match self {
            AnalysisSession::Repo(_) => AnalysisMode::Repo,
            AnalysisSession::Code(_) => AnalysisMode::Code,
            AnalysisSession::Both { .. } => AnalysisMode::Both,
        }
    }

    pub fn repo(&self) -> Option<&RepoFindings> {
        match self {
            AnalysisSession::Repo(repo) | AnalysisSession::Both { repo, .. } => Some(repo),
            AnalysisSession::Code(_) => None,
        }
    }

    pub fn code(&self) -> Option<&CodeFindings> {
        match self {
            AnalysisSession::Code(code) | AnalysisSession::Both { code, .. } => Some(code),
            AnalysisSession::Repo(_) => None,
        }
    }

    pub fn commit_enabled(&self) -> bool {
        self.repo().is_some()
    }

    pub fn som_enabled(&self) -> bool {
        self.repo().is_some_and(|r| r.som.is_some())
    }

    pub fn repo_enabled(&self) -> bool {
        self.repo().is_some()
    }

    pub fn code_enabled(&self) -> bool {
        self.code().is_some()
    }

    /// Headline score: the composite score when repo analysis ran,
    /// otherwise the code score.
    pub fn slop_score(&self) -> &SlopScoreResult {
        match self {
            AnalysisSession::Repo(repo) | AnalysisSession::Both { repo, .. } => &repo.score,
            AnalysisSession::Code(code) => &code.score,
        }
    }
}

/// Repo findings before any analysis has arrived.
#[derive(Debug)]
pub struct RepoStage {
    links: SomProjectLinks,
}

/// README analysis has arrived.
#[derive(Debug)]
pub struct ReadmeStage {
    links: SomProjectLinks,
    readme: ReadmeAnalysis,
}

/// Commit analysis (and devlogs, if any) have arrived; ready for scoring.
#[derive(Debug)]
pub struct ScoringStage {
    links: SomProjectLinks,
    readme: ReadmeAnalysis,
    commits: CommitAnalysis,
    som: Option<SomAnalysis>,
}

impl RepoStage {
    pub fn new(links: SomProjectLinks) -> Self {
        Self { links }
    }

    /// Repo URL the gateway should analyze; empty when SoM resolution failed.
    pub fn repo_url(&self) -> &str {
        self.links.repo_link.as_deref().unwrap_or("")
    }

    pub fn with_readme(self, readme: ReadmeAnalysis) -> ReadmeStage {
        ReadmeStage {
            links: self.links,
            readme,
        }
    }
}

impl ReadmeStage {
    pub fn with_commits(self, commits: CommitAnalysis) -> ScoringStage {
        ScoringStage {
            links: self.links,
            readme: self.readme,
            commits,
            som: None,
        }
    }
}

impl ScoringStage {
    pub fn with_som(self, som: SomAnalysis) -> Self {
        Self {
            som: Some(som),
            ..self
        }
    }

    pub fn readme(&self) -> &ReadmeAnalysis {
        &self.readme
    }

    pub fn commits(&self) -> &CommitAnalysis {
        &self.commits
    }

    pub fn som(&self) -> Option<&SomAnalysis> {
        self.som.as_ref()
    }

    pub fn with_score(self, score: SlopScoreResult) -> RepoFindings {
        RepoFindings {
            links: self.links,
            readme: self.readme,
            commits: self.commits,
            som: self.som,
            score,
        }
    }
}
