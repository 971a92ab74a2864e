pub mod context;
pub mod error;
pub mod invoker;
pub mod prompt;
pub mod runner;

pub use context::{RunContext, RunState};
pub use error::{AnalysisError, RunWarning};
pub use invoker::MAX_ATTEMPTS;
pub use runner::{Pipeline, RunOutcome};
