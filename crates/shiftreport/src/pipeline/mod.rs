pub mod config;
pub mod context;
pub mod error;
pub mod runner;

pub use config::PipelineConfig;
pub use context::PipelineContext;
pub use error::{PipelineError, PipelineWarning};
pub use runner::{Pipeline, RunOutcome, RunReport, FAILURE_SCREENSHOT, NO_FILE_SCREENSHOT};
