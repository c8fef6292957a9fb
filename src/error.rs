//! Typed errors for a single analysis run.
//!
//! Everything the orchestrator or the gateway client can fail with ends up
//! in [`AnalysisError`]. The binary edge wraps it in `anyhow` for reporting.

use thiserror::Error;

/// Errors produced while validating input or talking to the analysis gateway.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid project URL '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },

    #[error("Cannot connect to the analysis gateway at {url}. Is the backend running?")]
    Connect { url: String },

    #[error("Request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Gateway error {status} from {endpoint}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Failed to parse response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{step} timed out after {seconds}s")]
    Timeout { step: String, seconds: u64 },

    #[error("Analysis cancelled during {step}")]
    Cancelled { step: String },
}

impl AnalysisError {
    /// True when the gateway itself reported or caused the failure.
    ///
    /// Bad input, step deadlines and cancellation are decided locally.
    pub fn is_remote(&self) -> bool {
        !matches!(
            self,
            AnalysisError::InvalidUrl { .. }
                | AnalysisError::Timeout { .. }
                | AnalysisError::Cancelled { .. }
        )
    }
}
