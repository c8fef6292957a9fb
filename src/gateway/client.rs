//! reqwest-backed gateway client.

use super::AnalysisGateway;
use crate::error::AnalysisError;
use crate::models::{
    CodeAnalysis, CommitAnalysis, HealthStatus, ReadmeAnalysis, ScoreRequest, SlopScoreResult,
    SomAnalysis, SomProjectLinks,
};
use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

const SOM_PROJECT_PATH: &str = "/som-analysis/project";
const README_PATH: &str = "/repo-analysis/readme-analysis";
const COMMITS_PATH: &str = "/repo-analysis/commits-analysis";
const SOM_ANALYSIS_PATH: &str = "/som-analysis";
const SCORE_PATH: &str = "/repo-analysis";
const CODE_PATH: &str = "/code-analysis";
const HEALTH_PATH: &str = "/health";

/// HTTP client for the analysis gateway.
///
/// No authentication is attached; credentials live in the backend.
pub struct HttpGateway {
    client: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn new(base_url: impl Into<String>, connect_timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();

        let client = Client::builder()
            .connect_timeout(connect_timeout)
            .user_agent(concat!("slopscan/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_else(|e| {
                error!(error = %e, "Failed to build HTTP client, using default client");
                Client::new()
            });

        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str, query: &[(&str, &str)]) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.client.request(method, url);
        if query.is_empty() {
            builder
        } else {
            builder.query(query)
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, AnalysisError> {
        debug!("GET {}{} {:?}", self.base_url, path, query);
        let response = self
            .request(Method::GET, path, query)
            .send()
            .await
            .map_err(|e| self.send_error(path, e))?;
        decode(path, response).await
    }

    fn send_error(&self, path: &str, e: reqwest::Error) -> AnalysisError {
        if e.is_connect() {
            AnalysisError::Connect {
                url: self.base_url.clone(),
            }
        } else {
            AnalysisError::Transport {
                endpoint: path.to_string(),
                source: e,
            }
        }
    }
}

async fn decode<T: DeserializeOwned>(path: &str, response: Response) -> Result<T, AnalysisError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AnalysisError::Status {
            endpoint: path.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    response.json().await.map_err(|e| AnalysisError::Decode {
        endpoint: path.to_string(),
        source: e,
    })
}

#[async_trait]
impl AnalysisGateway for HttpGateway {
    async fn resolve_som_project(
        &self,
        project_url: &str,
    ) -> Result<SomProjectLinks, AnalysisError> {
        self.get_json(SOM_PROJECT_PATH, &[("project", project_url)])
            .await
    }

    async fn readme_analysis(&self, repo_url: &str) -> Result<ReadmeAnalysis, AnalysisError> {
        self.get_json(README_PATH, &[("repo_url", repo_url)]).await
    }

    async fn commits_analysis(&self, repo_url: &str) -> Result<CommitAnalysis, AnalysisError> {
        self.get_json(COMMITS_PATH, &[("repo_url", repo_url)]).await
    }

    async fn som_analysis(&self, project_url: &str) -> Result<SomAnalysis, AnalysisError> {
        self.get_json(SOM_ANALYSIS_PATH, &[("project", project_url)])
            .await
    }

    async fn score(&self, request: &ScoreRequest) -> Result<SlopScoreResult, AnalysisError> {
        debug!("POST {}{}", self.base_url, SCORE_PATH);
        let response = self
            .request(Method::POST, SCORE_PATH, &[])
            .json(request)
            .send()
            .await
            .map_err(|e| self.send_error(SCORE_PATH, e))?;
        decode(SCORE_PATH, response).await
    }

    async fn code_analysis(&self, repo_url: &str) -> Result<CodeAnalysis, AnalysisError> {
        self.get_json(CODE_PATH, &[("repo_url", repo_url)]).await
    }

    async fn health(&self) -> Result<HealthStatus, AnalysisError> {
        self.get_json(HEALTH_PATH, &[]).await
    }
}
