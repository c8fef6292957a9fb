//! Analysis pipeline: step plan, orchestration, session assembly and
//! score aggregation.

pub mod aggregator;
pub mod orchestrator;
pub mod progress;
pub mod session;

pub use orchestrator::{AnalysisRequest, Orchestrator};
pub use progress::ProgressSink;
pub use session::AnalysisSession;
