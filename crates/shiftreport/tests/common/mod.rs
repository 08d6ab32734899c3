//! Shared test doubles: a scripted console driver and a recording mailer.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use shiftreport::config::{default_categories, Locators, Timing, MAIL_BODY, SUBJECT_SUFFIX};
use shiftreport::driver::{DriverError, UiDriver};
use shiftreport::mailer::{MailError, Mailer, ReportMessage};
use shiftreport::pipeline::PipelineConfig;
use shiftreport::window::site_offset;

use secrecy::SecretString;

/// Pipeline config wired to temp directories with all waits zeroed.
pub fn test_config(staging_dir: &Path, screenshot_dir: &Path) -> PipelineConfig {
    PipelineConfig {
        login_url: "https://console.test/index.php".to_string(),
        report_url: "https://console.test/Report/report_other_status.php".to_string(),
        console_username: "operator".to_string(),
        console_password: SecretString::from("console-pass".to_string()),
        locators: Locators::default(),
        timing: Timing {
            element_wait: Duration::ZERO,
            login_wait: Duration::ZERO,
            category_wait: Duration::ZERO,
            search_wait: Duration::ZERO,
            report_settle: Duration::ZERO,
            download_settle: Duration::ZERO,
            keyword_pause: Duration::ZERO,
            keyword_settle: Duration::ZERO,
        },
        categories: default_categories(),
        staging_dir: staging_dir.to_path_buf(),
        screenshot_dir: screenshot_dir.to_path_buf(),
        site_offset: site_offset(7),
        recipients: vec!["ops@example.com".to_string()],
        subject_suffix: SUBJECT_SUFFIX.to_string(),
        mail_body: MAIL_BODY.to_string(),
    }
}

/// Scripted [`UiDriver`]: records every interaction, fails on demand and
/// plays the remote console's part of depositing the export download.
#[derive(Default)]
pub struct FakeDriver {
    pub actions: Mutex<Vec<String>>,
    /// `"operation:selector"` keys that should fail.
    pub failures: HashSet<String>,
    /// Typed texts that should fail regardless of target input.
    pub typing_failures: HashSet<String>,
    /// File the "console" writes when the export control is clicked.
    pub export_payload: Option<(PathBuf, Vec<u8>)>,
}

impl FakeDriver {
    pub fn with_export(path: PathBuf, bytes: &[u8]) -> Self {
        Self {
            export_payload: Some((path, bytes.to_vec())),
            ..Self::default()
        }
    }

    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }

    fn record(&self, action: String) {
        self.actions.lock().unwrap().push(action);
    }

    fn check(&self, operation: &str, selector: &str) -> Result<(), DriverError> {
        self.record(format!("{operation}:{selector}"));
        if self.failures.contains(&format!("{operation}:{selector}")) {
            Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
                timeout: Duration::ZERO,
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl UiDriver for FakeDriver {
    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.check("navigate", url)
    }

    async fn wait_visible(&self, selector: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.check("wait_visible", selector)
    }

    async fn wait_gone(&self, selector: &str, _timeout: Duration) -> Result<(), DriverError> {
        self.check("wait_gone", selector)
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<(), DriverError> {
        if self.typing_failures.contains(text) {
            self.record(format!("type_into:{selector}:{text}"));
            return Err(DriverError::ElementNotFound {
                selector: selector.to_string(),
                timeout: Duration::ZERO,
            });
        }
        self.check("type_into", selector)
    }

    async fn clear_value(&self, selector: &str) -> Result<(), DriverError> {
        self.check("clear_value", selector)
    }

    async fn click(&self, selector: &str) -> Result<(), DriverError> {
        self.check("click", selector)
    }

    async fn click_via_script(&self, selectors: &[&str]) -> Result<(), DriverError> {
        let combined = selectors.join(", ");
        self.check("click_via_script", &combined)?;
        if combined.contains("#btnexport") {
            if let Some((path, bytes)) = &self.export_payload {
                std::fs::write(path, bytes).expect("fake export write");
            }
        }
        Ok(())
    }

    async fn press_enter(&self, selector: &str) -> Result<(), DriverError> {
        self.check("press_enter", selector)
    }

    async fn select_option_containing(
        &self,
        selector: &str,
        _labels: &[&str],
        _timeout: Duration,
    ) -> Result<(), DriverError> {
        self.check("select_option", selector)
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(format!("screenshot:{name}"));
        Ok(())
    }
}

/// Records sent messages; optionally refuses to send.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<ReportMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<ReportMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &ReportMessage) -> Result<(), MailError> {
        if self.fail {
            return Err(MailError::Attachment {
                path: message.attachment_path.clone(),
                source: std::io::Error::other("smtp unavailable"),
            });
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

/// A well-formed console export: an HTML table wearing an `.xls` extension.
pub const EXPORT_HTML: &str = r#"
<html><body>
<table>
    <tr><th>Driver</th><th>Event</th><th>Time</th></tr>
    <tr><td>Somchai</td><td>ความง่วงระดับ 1</td><td>2024-03-14 19:22</td></tr>
    <tr><td>Anan</td><td>หาว</td><td>2024-03-15 02:15</td></tr>
</table>
</body></html>"#;
