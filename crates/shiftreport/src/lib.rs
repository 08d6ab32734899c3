pub mod config;
pub mod convert;
pub mod driver;
pub mod error;
pub mod mailer;
pub mod pipeline;
pub mod secrets;
pub mod staging;
pub mod window;

pub use config::{ConfigError, Settings};
pub use convert::{ConvertedArtifact, TabularDocument};
pub use driver::{DriverError, UiDriver};
pub use error::{Result, ShiftReportError};
pub use mailer::{MailError, Mailer, ReportMessage, SmtpMailer};
pub use pipeline::{Pipeline, PipelineConfig, PipelineContext, RunOutcome, RunReport};
pub use secrets::{resolve_secret, SecretError};
pub use staging::StagedFile;
pub use window::ReportWindow;
