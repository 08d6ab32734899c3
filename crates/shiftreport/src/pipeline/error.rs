use std::path::PathBuf;

use thiserror::Error;

use crate::driver::DriverError;
use crate::mailer::MailError;
use crate::staging::StagingError;

/// Structural failures: these abort the run, trigger a diagnostic screenshot
/// and terminate the process with a non-zero exit.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Login failed: {0}")]
    Login(#[source] DriverError),

    #[error("Report page navigation failed: {0}")]
    Navigation(#[source] DriverError),

    #[error("Query configuration failed: {0}")]
    QueryConfiguration(#[source] DriverError),

    #[error("Export failed: {0}")]
    Export(#[source] DriverError),

    #[error("Staging directory failure: {0}")]
    Staging(#[from] StagingError),

    #[error("No report file was produced by the export")]
    NoFileProduced,

    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] MailError),
}

/// Tolerated failures: logged, recorded, run continues with degraded scope.
#[derive(Debug, Clone)]
pub enum PipelineWarning {
    CategoryControlUnavailable { error: String },
    CategorySelection { keyword: String, error: String },
    SearchTrigger { error: String },
    Conversion { error: String },
    Cleanup { path: PathBuf, error: String },
}
