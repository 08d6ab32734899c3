//! SMTP submission client for the report mail.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use super::{MailError, Mailer, ReportMessage, Result};

/// Sends the report through an authenticated STARTTLS relay (the reference
/// deployment uses the Gmail submission service).
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    sender_name: String,
    username: String,
}

impl SmtpMailer {
    pub fn new(
        relay: &str,
        sender_name: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<Self> {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::relay(relay)?
            .credentials(Credentials::new(
                username.to_string(),
                password.expose_secret().to_string(),
            ))
            .build();
        Ok(Self {
            transport,
            sender_name: sender_name.to_string(),
            username: username.to_string(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, message: &ReportMessage) -> Result<()> {
        let attachment_bytes = tokio::fs::read(&message.attachment_path)
            .await
            .map_err(|e| MailError::Attachment {
                path: message.attachment_path.clone(),
                source: e,
            })?;

        let email = build_message(
            &self.sender_name,
            &self.username,
            message,
            attachment_bytes,
        )?;

        info!(
            recipients = message.recipients.len(),
            subject = %message.subject,
            "sending report mail"
        );
        self.transport.send(email).await?;
        Ok(())
    }
}

/// Assembles the full MIME message: plain-text body plus one attachment.
fn build_message(
    sender_name: &str,
    sender_address: &str,
    message: &ReportMessage,
    attachment_bytes: Vec<u8>,
) -> Result<Message> {
    let from = format!("{sender_name} <{sender_address}>");
    let mut builder = Message::builder().from(parse_mailbox(&from)?);
    for recipient in &message.recipients {
        builder = builder.to(parse_mailbox(recipient)?);
    }

    let mime = mime_guess::from_path(&message.attachment_path).first_or_octet_stream();
    let content_type = ContentType::parse(mime.essence_str())
        .map_err(|_| MailError::ContentType(mime.essence_str().to_string()))?;

    let email = builder.subject(message.subject.as_str()).multipart(
        MultiPart::mixed()
            .singlepart(SinglePart::plain(message.body.clone()))
            .singlepart(
                Attachment::new(message.attachment_name.clone())
                    .body(attachment_bytes, content_type),
            ),
    )?;
    Ok(email)
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address.parse().map_err(|e| MailError::Address {
        address: address.to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sample_message() -> ReportMessage {
        ReportMessage {
            recipients: vec!["ops@example.com".to_string()],
            subject: "report_2024-03-15.xls ช่วง1800ถึง0600".to_string(),
            body: "รายงานกะกลางคืน".to_string(),
            attachment_path: PathBuf::from("report_2024-03-15.xls"),
            attachment_name: "report_2024-03-15.xls".to_string(),
        }
    }

    #[test]
    fn test_build_message_with_attachment() {
        let email = build_message(
            "DTC DMS Reporter",
            "reporter@example.com",
            &sample_message(),
            b"<table></table>".to_vec(),
        )
        .unwrap();

        let raw = String::from_utf8_lossy(&email.formatted()).to_string();
        assert!(raw.contains("DTC DMS Reporter"));
        assert!(raw.contains("ops@example.com"));
        assert!(raw.contains("report_2024-03-15.xls"));
    }

    #[test]
    fn test_build_message_multiple_recipients() {
        let mut message = sample_message();
        message.recipients = vec![
            "first@example.com".to_string(),
            "second@example.com".to_string(),
        ];
        let email = build_message("R", "r@example.com", &message, vec![1, 2, 3]).unwrap();
        let raw = String::from_utf8_lossy(&email.formatted()).to_string();
        assert!(raw.contains("first@example.com"));
        assert!(raw.contains("second@example.com"));
    }

    #[test]
    fn test_build_message_invalid_recipient() {
        let mut message = sample_message();
        message.recipients = vec!["not an address".to_string()];
        let err = build_message("R", "r@example.com", &message, vec![]).unwrap_err();
        assert!(matches!(err, MailError::Address { .. }));
    }
}
