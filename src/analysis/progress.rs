//! Step plan and progress reporting for a run.
//!
//! The plan is fixed before the first request goes out, so every
//! checkpoint percentage is known up front and the reported values can
//! only move forward.

use crate::models::AnalysisMode;
use std::fmt;

/// Receives `(percent, status)` updates while a run is in flight.
pub trait ProgressSink: Send {
    fn report(&mut self, percent: u8, status: &str);
}

impl<F> ProgressSink for F
where
    F: FnMut(u8, &str) + Send,
{
    fn report(&mut self, percent: u8, status: &str) {
        self(percent, status)
    }
}

/// A single gateway call in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    ResolveLinks,
    Readme,
    Commits,
    SomDevlogs,
    Score,
    Code,
}

impl Step {
    /// Status line shown while this step runs.
    pub fn status(&self) -> &'static str {
        match self {
            Step::ResolveLinks => "Resolving Summer of Making project links",
            Step::Readme => "Analyzing README",
            Step::Commits => "Analyzing commit history",
            Step::SomDevlogs => "Analyzing devlogs",
            Step::Score => "Computing slop score",
            Step::Code => "Analyzing source code",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.status())
    }
}

pub const COMPLETE_STATUS: &str = "Analysis complete";

/// Ordered list of steps for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepPlan {
    steps: Vec<Step>,
}

impl StepPlan {
    pub fn new(mode: AnalysisMode, is_som: bool) -> Self {
        let mut steps = Vec::with_capacity(6);

        if is_som {
            steps.push(Step::ResolveLinks);
        }
        if mode.includes_repo() {
            steps.push(Step::Readme);
            steps.push(Step::Commits);
            if is_som {
                steps.push(Step::SomDevlogs);
            }
            steps.push(Step::Score);
        }
        if mode.includes_code() {
            steps.push(Step::Code);
        }

        Self { steps }
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Checkpoint reported when `step` starts. Always in `5..95`.
    pub fn percent_at(&self, step: Step) -> u8 {
        let n = self.steps.len().max(1);
        let index = self.steps.iter().position(|s| *s == step).unwrap_or(n - 1);
        (5 + index * 90 / n) as u8
    }
}

/// Forwards checkpoints to a sink, never letting the value go backwards.
pub struct ProgressTracker<'a> {
    plan: StepPlan,
    sink: &'a mut dyn ProgressSink,
    last: u8,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(plan: StepPlan, sink: &'a mut dyn ProgressSink) -> Self {
        Self {
            plan,
            sink,
            last: 0,
        }
    }

    pub fn begin(&mut self, step: Step) {
        let percent = self.plan.percent_at(step).max(self.last);
        self.last = percent;
        self.sink.report(percent, step.status());
    }

    pub fn complete(&mut self) {
        self.last = 100;
        self.sink.report(100, COMPLETE_STATUS);
    }
}
