//! Outbound mail dispatch.

pub mod smtp;

pub use smtp::SmtpMailer;

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while composing or sending the report mail.
#[derive(Error, Debug)]
pub enum MailError {
    /// A sender or recipient address did not parse.
    #[error("Invalid mail address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    /// The attachment could not be read from disk.
    #[error("Failed to read attachment '{path}': {source}")]
    Attachment {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The attachment's content type was not usable.
    #[error("Unsupported attachment content type '{0}'")]
    ContentType(String),

    /// Message assembly failed.
    #[error("Failed to assemble message: {0}")]
    Message(#[from] lettre::error::Error),

    /// The SMTP conversation failed.
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

pub type Result<T> = std::result::Result<T, MailError>;

/// One report mail: fixed body, deterministic subject, single attachment.
#[derive(Debug, Clone)]
pub struct ReportMessage {
    pub recipients: Vec<String>,
    pub subject: String,
    pub body: String,
    pub attachment_path: PathBuf,
    pub attachment_name: String,
}

/// Capability to deliver one message with an attachment.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &ReportMessage) -> Result<()>;
}
