use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShiftReportError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Driver error: {0}")]
    Driver(#[from] crate::driver::DriverError),

    #[error("Mail error: {0}")]
    Mail(#[from] crate::mailer::MailError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] crate::pipeline::PipelineError),
}

pub type Result<T> = std::result::Result<T, ShiftReportError>;
