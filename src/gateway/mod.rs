//! Remote analysis gateway.
//!
//! The gateway is the backend that talks to the LLM, GitHub and Summer of
//! Making. The orchestrator only sees the [`AnalysisGateway`] trait so a run
//! can be driven against an in-memory double in tests.

pub mod client;

pub use client::HttpGateway;

use crate::error::AnalysisError;
use crate::models::{
    CodeAnalysis, CommitAnalysis, HealthStatus, ReadmeAnalysis, ScoreRequest, SlopScoreResult,
    SomAnalysis, SomProjectLinks,
};
use async_trait::async_trait;

/// One method per gateway endpoint.
#[async_trait]
pub trait AnalysisGateway: Send + Sync {
    /// `GET /som-analysis/project?project=<url>`
    async fn resolve_som_project(&self, project_url: &str)
        -> Result<SomProjectLinks, AnalysisError>;

    /// `GET /repo-analysis/readme-analysis?repo_url=<url>`
    async fn readme_analysis(&self, repo_url: &str) -> Result<ReadmeAnalysis, AnalysisError>;

    /// `GET /repo-analysis/commits-analysis?repo_url=<url>`
    async fn commits_analysis(&self, repo_url: &str) -> Result<CommitAnalysis, AnalysisError>;

    /// `GET /som-analysis?project=<url>`
    async fn som_analysis(&self, project_url: &str) -> Result<SomAnalysis, AnalysisError>;

    /// `POST /repo-analysis`
    async fn score(&self, request: &ScoreRequest) -> Result<SlopScoreResult, AnalysisError>;

    /// `GET /code-analysis?repo_url=<url>`
    async fn code_analysis(&self, repo_url: &str) -> Result<CodeAnalysis, AnalysisError>;

    /// `GET /health`
    async fn health(&self) -> Result<HealthStatus, AnalysisError>;
}
