//! Sequential analysis pipeline.
//!
//! Every gateway call is one step. Steps run strictly one after another,
//! each under its own deadline and raced against the run's cancellation
//! token. A failing step ends the run with its error; only SoM link
//! resolution is allowed to fail softly.

use crate::analysis::aggregator;
use crate::analysis::progress::{ProgressSink, ProgressTracker, Step, StepPlan};
use crate::analysis::session::{AnalysisSession, CodeFindings, RepoFindings, RepoStage};
use crate::error::AnalysisError;
use crate::gateway::AnalysisGateway;
use crate::models::{AnalysisMode, SomProjectLinks};
use crate::source::SourceUrl;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// What to analyze and how.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub source: SourceUrl,
    pub mode: AnalysisMode,
}

impl AnalysisRequest {
    pub fn new(source: SourceUrl, mode: AnalysisMode) -> Self {
        Self { source, mode }
    }
}

/// Drives one run at a time against a gateway.
pub struct Orchestrator {
    gateway: Arc<dyn AnalysisGateway>,
    step_timeout: Duration,
}

impl Orchestrator {
    pub fn new(gateway: Arc<dyn AnalysisGateway>, step_timeout: Duration) -> Self {
        Self {
            gateway,
            step_timeout,
        }
    }

    /// Run the full pipeline for `request`.
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        progress: &mut dyn ProgressSink,
        cancel: &CancellationToken,
    ) -> Result<AnalysisSession, AnalysisError> {
        let started = Instant::now();
        let plan = StepPlan::new(request.mode, request.source.is_som());
        debug!("Step plan: {:?}", plan.steps());
        let mut tracker = ProgressTracker::new(plan, progress);

        info!("Starting {} analysis for {}", request.mode, request.source);

        let links = self.resolve_links(&request.source, &mut tracker, cancel).await?;

        let session = match request.mode {
            AnalysisMode::Repo => {
                let repo = self
                    .run_repo_steps(&request.source, links, &mut tracker, cancel)
                    .await?;
                AnalysisSession::Repo(repo)
            }
            AnalysisMode::Code => {
                let code = self.run_code_steps(&links, &mut tracker, cancel).await?;
                AnalysisSession::Code(code)
            }
            AnalysisMode::Both => {
                let repo = self
                    .run_repo_steps(&request.source, links.clone(), &mut tracker, cancel)
                    .await?;
                let code = self.run_code_steps(&links, &mut tracker, cancel).await?;
                AnalysisSession::Both { repo, code }
            }
        };

        tracker.complete();
        info!(
            "Analysis finished in {:.1}s, slop score {:.0}",
            started.elapsed().as_secs_f64(),
            session.slop_score().slopscore
        );

        Ok(session)
    }

    /// SoM pages resolve to their repo; a GitHub URL is its own repo link.
    async fn resolve_links(
        &self,
        source: &SourceUrl,
        tracker: &mut ProgressTracker<'_>,
        cancel: &CancellationToken,
    ) -> Result<SomProjectLinks, AnalysisError> {
        if !source.is_som() {
            return Ok(SomProjectLinks {
                repo_link: Some(source.as_str().to_string()),
                readme_link: None,
            });
        }

        tracker.begin(Step::ResolveLinks);
        let resolved = self
            .step(
                Step::ResolveLinks,
                cancel,
                self.gateway.resolve_som_project(source.as_str()),
            )
            .await;

        match resolved {
            Ok(links) => {
                debug!("Resolved project links: {:?}", links);
                if links.repo_link.is_none() {
                    warn!("Project {} has no repository link", source);
                }
                Ok(links)
            }
            Err(e @ AnalysisError::Cancelled { .. }) => Err(e),
            Err(e) => {
                warn!("Failed to resolve project links, continuing without: {}", e);
                Ok(SomProjectLinks::default())
            }
        }
    }

    async fn run_repo_steps(
        &self,
        source: &SourceUrl,
        links: SomProjectLinks,
        tracker: &mut ProgressTracker<'_>,
        cancel: &CancellationToken,
    ) -> Result<RepoFindings, AnalysisError> {
        let stage = RepoStage::new(links);
        let repo_url = stage.repo_url().to_string();

        tracker.begin(Step::Readme);
        let readme = self
            .step(Step::Readme, cancel, self.gateway.readme_analysis(&repo_url))
            .await?;
        let stage = stage.with_readme(readme);

        tracker.begin(Step::Commits);
        let commits = self
            .step(Step::Commits, cancel, self.gateway.commits_analysis(&repo_url))
            .await?;
        let mut stage = stage.with_commits(commits);

        if source.is_som() {
            tracker.begin(Step::SomDevlogs);
            let som = self
                .step(
                    Step::SomDevlogs,
                    cancel,
                    self.gateway.som_analysis(source.as_str()),
                )
                .await?;
            stage = stage.with_som(som);
        }

        tracker.begin(Step::Score);
        let score = self
            .step(
                Step::Score,
                cancel,
                aggregator::compute_slop_score(
                    self.gateway.as_ref(),
                    stage.readme(),
                    stage.commits(),
                    stage.som(),
                ),
            )
            .await?;
        debug!("Composite score: {:?}", score);

        Ok(stage.with_score(score))
    }

    async fn run_code_steps(
        &self,
        links: &SomProjectLinks,
        tracker: &mut ProgressTracker<'_>,
        cancel: &CancellationToken,
    ) -> Result<CodeFindings, AnalysisError> {
        let repo_url = links.repo_link.clone().unwrap_or_default();

        tracker.begin(Step::Code);
        let code = self
            .step(Step::Code, cancel, self.gateway.code_analysis(&repo_url))
            .await?;

        Ok(CodeFindings::new(repo_url, code))
    }

    /// Await one gateway call under the step deadline and the cancel token.
    async fn step<T, F>(
        &self,
        step: Step,
        cancel: &CancellationToken,
        call: F,
    ) -> Result<T, AnalysisError>
    where
        F: Future<Output = Result<T, AnalysisError>>,
    {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AnalysisError::Cancelled {
                step: step.to_string(),
            }),
            result = tokio::time::timeout(self.step_timeout, call) => match result {
                Ok(outcome) => outcome,
                Err(_) => Err(AnalysisError::Timeout {
                    step: step.to_string(),
                    seconds: self.step_timeout.as_secs(),
                }),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        CodeAiAnalysis, CodeAnalysis, CodeAnalysisResults, CommitAnalysis, HealthStatus,
        ReadmeAnalysis, ScoreRequest, SlopScoreResult, SomAnalysis,
    };
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const SOM_URL: &str = "https://summer.hackclub.com/projects/42";
    const RESOLVED_REPO: &str = "https://github.com/maker/project";

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Resolve(String),
        Readme(String),
        Commits(String),
        Som(String),
        Score(serde_json::Value),
        Code(String),
    }

    /// In-memory gateway that records every call.
    #[derive(Default)]
    struct RecordingGateway {
        calls: Mutex<Vec<Call>>,
        fail_resolve: bool,
        fail_commits: bool,
        slow_readme: bool,
        code_ai: f64,
    }

    impl RecordingGateway {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) {
            self.calls.lock().unwrap().push(call);
        }
    }

    #[async_trait]
    impl AnalysisGateway for RecordingGateway {
        async fn resolve_som_project(
            &self,
            project_url: &str,
        ) -> Result<SomProjectLinks, AnalysisError> {
            self.record(Call::Resolve(project_url.to_string()));
            if self.fail_resolve {
                return Err(AnalysisError::Status {
                    endpoint: "/som-analysis/project".to_string(),
                    status: 500,
                    body: "cookie expired".to_string(),
                });
            }
            Ok(SomProjectLinks {
                repo_link: Some(RESOLVED_REPO.to_string()),
                readme_link: Some(format!("{RESOLVED_REPO}/blob/main/README.md")),
            })
        }

        async fn readme_analysis(&self, repo_url: &str) -> Result<ReadmeAnalysis, AnalysisError> {
            self.record(Call::Readme(repo_url.to_string()));
            if self.slow_readme {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            Ok(ReadmeAnalysis {
                probability: Some(40.0),
                reasoning: Some("casual tone".to_string()),
                ..Default::default()
            })
        }

        async fn commits_analysis(
            &self,
            repo_url: &str,
        ) -> Result<CommitAnalysis, AnalysisError> {
            self.record(Call::Commits(repo_url.to_string()));
            if self.fail_commits {
                return Err(AnalysisError::Status {
                    endpoint: "/repo-analysis/commits-analysis".to_string(),
                    status: 400,
                    body: "rate limited".to_string(),
                });
            }
            Ok(CommitAnalysis {
                owner: "acme".to_string(),
                repo: "widget".to_string(),
                total_commits: 30,
                ..Default::default()
            })
        }

        async fn som_analysis(&self, project_url: &str) -> Result<SomAnalysis, AnalysisError> {
            self.record(Call::Som(project_url.to_string()));
            Ok(SomAnalysis {
                probability: Some(15.0),
                ..Default::default()
            })
        }

        async fn score(&self, request: &ScoreRequest) -> Result<SlopScoreResult, AnalysisError> {
            self.record(Call::Score(serde_json::to_value(request).unwrap()));
            Ok(SlopScoreResult {
                slopscore: 37.0,
                reasoning: "mostly human".to_string(),
                main_factors: vec!["natural commit cadence".to_string()],
            })
        }

        async fn code_analysis(&self, repo_url: &str) -> Result<CodeAnalysis, AnalysisError> {
            self.record(Call::Code(repo_url.to_string()));
            Ok(CodeAnalysis {
                total_files_analyzed: 12,
                ai_analysis: CodeAiAnalysis {
                    analysis_results: CodeAnalysisResults {
                        ai: self.code_ai,
                        ..Default::default()
                    },
                },
                ..Default::default()
            })
        }

        async fn health(&self) -> Result<HealthStatus, AnalysisError> {
            Ok(HealthStatus {
                status: "healthy".to_string(),
                service: "test".to_string(),
            })
        }
    }

    fn orchestrator(gateway: &Arc<RecordingGateway>) -> Orchestrator {
        Orchestrator::new(gateway.clone(), Duration::from_secs(5))
    }

    fn request(url: &str, mode: AnalysisMode) -> AnalysisRequest {
        AnalysisRequest::new(url.parse().unwrap(), mode)
    }

    async fn run_collecting(
        orchestrator: &Orchestrator,
        request: &AnalysisRequest,
    ) -> (Result<AnalysisSession, AnalysisError>, Vec<(u8, String)>) {
        let mut events = Vec::new();
        let result = {
            let mut sink = |percent: u8, status: &str| events.push((percent, status.to_string()));
            orchestrator
                .run(request, &mut sink, &CancellationToken::new())
                .await
        };
        (result, events)
    }

    fn assert_progress_shape(events: &[(u8, String)]) {
        let percents: Vec<u8> = events.iter().map(|(p, _)| *p).collect();
        assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{percents:?}");
        assert_eq!(percents.iter().filter(|p| **p == 100).count(), 1);
        assert_eq!(percents.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_repo_mode_github_url() {
        let gateway = Arc::new(RecordingGateway::default());
        let url = "https://github.com/acme/widget";

        let (result, events) =
            run_collecting(&orchestrator(&gateway), &request(url, AnalysisMode::Repo)).await;
        let session = result.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[0], Call::Readme(url.to_string()));
        assert_eq!(calls[1], Call::Commits(url.to_string()));
        match &calls[2] {
            Call::Score(body) => {
                assert_eq!(body["som_analysis"], json!({}));
                assert_eq!(body["readme_analysis"]["probability"], json!(40.0));
                assert_eq!(body["repo_analysis"]["total_commits"], json!(30));
            }
            other => panic!("expected score call, got {other:?}"),
        }

        assert!(session.repo_enabled());
        assert!(!session.som_enabled());
        assert!(!session.code_enabled());
        assert_eq!(session.slop_score().slopscore, 37.0);
        assert_eq!(
            session.slop_score().main_factors,
            vec!["natural commit cadence".to_string()]
        );

        let percents: Vec<u8> = events.iter().map(|(p, _)| *p).collect();
        assert_eq!(percents, vec![5, 35, 65, 100]);
        assert_progress_shape(&events);
    }

    #[tokio::test]
    async fn test_code_mode_score_equals_code_ai() {
        let gateway = Arc::new(RecordingGateway {
            code_ai: 91.5,
            ..Default::default()
        });
        let url = "https://github.com/acme/widget";

        let (result, events) =
            run_collecting(&orchestrator(&gateway), &request(url, AnalysisMode::Code)).await;
        let session = result.unwrap();

        assert_eq!(gateway.calls(), vec![Call::Code(url.to_string())]);
        let code = session.code().unwrap();
        assert_eq!(
            session.slop_score().slopscore,
            code.code.ai_analysis.analysis_results.ai
        );
        assert_eq!(session.slop_score().slopscore, 91.5);
        assert!(!session.repo_enabled());
        assert!(!session.commit_enabled());
        assert_progress_shape(&events);
    }

    #[tokio::test]
    async fn test_both_mode_som_url_uses_resolved_repo() {
        let gateway = Arc::new(RecordingGateway::default());

        let (result, events) =
            run_collecting(&orchestrator(&gateway), &request(SOM_URL, AnalysisMode::Both)).await;
        let session = result.unwrap();

        assert!(session.som_enabled());
        assert!(session.code_enabled());
        assert_eq!(session.code().unwrap().repo_url, RESOLVED_REPO);

        let calls = gateway.calls();
        assert_eq!(calls[0], Call::Resolve(SOM_URL.to_string()));
        assert_eq!(calls[1], Call::Readme(RESOLVED_REPO.to_string()));
        assert_eq!(calls[2], Call::Commits(RESOLVED_REPO.to_string()));
        assert_eq!(calls[3], Call::Som(SOM_URL.to_string()));
        match &calls[4] {
            Call::Score(body) => assert_eq!(body["som_analysis"]["probability"], json!(15.0)),
            other => panic!("expected score call, got {other:?}"),
        }
        assert_eq!(calls[5], Call::Code(RESOLVED_REPO.to_string()));
        assert_eq!(calls.len(), 6);

        // Resolution happens once even though both halves need the link.
        let resolves = calls
            .iter()
            .filter(|c| matches!(c, Call::Resolve(_)))
            .count();
        assert_eq!(resolves, 1);

        assert_eq!(events.len(), 7);
        assert_progress_shape(&events);
    }

    #[tokio::test]
    async fn test_both_mode_github_url_keeps_som_disabled() {
        let gateway = Arc::new(RecordingGateway::default());
        let url = "https://github.com/acme/widget";

        let (result, _) =
            run_collecting(&orchestrator(&gateway), &request(url, AnalysisMode::Both)).await;
        let session = result.unwrap();

        assert!(!session.som_enabled());
        assert!(session.code_enabled());
        assert!(!gateway
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Resolve(_) | Call::Som(_))));
    }

    #[tokio::test]
    async fn test_failed_resolution_continues_with_empty_links() {
        let gateway = Arc::new(RecordingGateway {
            fail_resolve: true,
            ..Default::default()
        });

        let (result, _) =
            run_collecting(&orchestrator(&gateway), &request(SOM_URL, AnalysisMode::Code)).await;
        let session = result.unwrap();

        assert_eq!(
            gateway.calls(),
            vec![Call::Resolve(SOM_URL.to_string()), Call::Code(String::new())]
        );
        assert_eq!(session.code().unwrap().repo_url, "");
    }

    #[tokio::test]
    async fn test_failure_aborts_remaining_steps() {
        let gateway = Arc::new(RecordingGateway {
            fail_commits: true,
            ..Default::default()
        });
        let url = "https://github.com/acme/widget";

        let (result, events) =
            run_collecting(&orchestrator(&gateway), &request(url, AnalysisMode::Both)).await;

        match result {
            Err(AnalysisError::Status { status, body, .. }) => {
                assert_eq!(status, 400);
                assert_eq!(body, "rate limited");
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            gateway.calls(),
            vec![Call::Readme(url.to_string()), Call::Commits(url.to_string())]
        );
        assert!(events.iter().all(|(p, _)| *p < 100));
    }

    #[tokio::test]
    async fn test_step_timeout() {
        let gateway = Arc::new(RecordingGateway {
            slow_readme: true,
            ..Default::default()
        });
        let orchestrator = Orchestrator::new(gateway.clone(), Duration::from_millis(50));

        let (result, _) = run_collecting(
            &orchestrator,
            &request("https://github.com/acme/widget", AnalysisMode::Repo),
        )
        .await;

        match result {
            Err(AnalysisError::Timeout { step, .. }) => assert_eq!(step, "Analyzing README"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(gateway.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_issues_no_calls() {
        let gateway = Arc::new(RecordingGateway::default());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let mut sink = |_: u8, _: &str| {};
        let result = orchestrator(&gateway)
            .run(
                &request(SOM_URL, AnalysisMode::Repo),
                &mut sink,
                &cancel,
            )
            .await;

        assert!(matches!(result, Err(AnalysisError::Cancelled { .. })));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_cancel_during_step_stops_pipeline() {
        let gateway = Arc::new(RecordingGateway {
            slow_readme: true,
            ..Default::default()
        });
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let mut sink = |_: u8, _: &str| {};
        let result = orchestrator(&gateway)
            .run(
                &request("https://github.com/acme/widget", AnalysisMode::Repo),
                &mut sink,
                &cancel,
            )
            .await;

        match result {
            Err(AnalysisError::Cancelled { step }) => assert_eq!(step, "Analyzing README"),
            other => panic!("unexpected: {other:?}"),
        }
        assert_eq!(
            gateway.calls(),
            vec![Call::Readme("https://github.com/acme/widget".to_string())]
        );
        assert!(!gateway
            .calls()
            .iter()
            .any(|c| matches!(c, Call::Commits(_))));
    }

    #[tokio::test]
    async fn test_repo_mode_failed_resolution_still_analyzes_devlogs() {
        let gateway = Arc::new(RecordingGateway {
            fail_resolve: true,
            ..Default::default()
        });

        let (result, events) =
            run_collecting(&orchestrator(&gateway), &request(SOM_URL, AnalysisMode::Repo)).await;
        let session = result.unwrap();

        let calls = gateway.calls();
        assert_eq!(calls.len(), 5);
        assert_eq!(
            &calls[..4],
            &[
                Call::Resolve(SOM_URL.to_string()),
                Call::Readme(String::new()),
                Call::Commits(String::new()),
                Call::Som(SOM_URL.to_string()),
            ]
        );
        assert!(matches!(calls[4], Call::Score(_)));

        let repo = session.repo().unwrap();
        assert!(repo.links.is_empty());
        assert!(session.som_enabled());
        assert_progress_shape(&events);
    }

    #[test]
    fn test_invalid_url_never_reaches_gateway() {
        let input = "not a url";

        assert_eq!(
            crate::source::validation_message(input),
            Some(crate::source::INVALID_URL_MESSAGE)
        );
        let parsed = input.parse::<SourceUrl>();
        assert!(matches!(parsed, Err(AnalysisError::InvalidUrl { .. })));
    }
}
