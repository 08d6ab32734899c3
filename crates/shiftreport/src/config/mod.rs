//! Process configuration.
//!
//! Everything a run needs (credentials, console URLs, element locators,
//! timing profile, staging paths) is resolved from the environment once at
//! startup into a [`Settings`] value and passed into the pipeline. Nothing is
//! looked up ambiently after that; the lifecycle of a `Settings` is one run.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

use crate::secrets::{require_var, resolve_secret, SecretError};
use crate::window::DEFAULT_UTC_OFFSET_HOURS;

/// Console login: username env var.
pub const ENV_CONSOLE_USERNAME: &str = "DTC_USERNAME";
/// Console login: password env var (or `DTC_PASSWORD_FILE`).
pub const ENV_CONSOLE_PASSWORD: &str = "DTC_PASSWORD";
/// Mail submission account env var.
pub const ENV_MAIL_USER: &str = "EMAIL_USER";
/// Mail submission password env var (or `EMAIL_PASS_FILE`).
pub const ENV_MAIL_PASSWORD: &str = "EMAIL_PASS";
/// Comma-separated recipient list env var.
pub const ENV_MAIL_RECIPIENTS: &str = "EMAIL_TO";

const DEFAULT_BASE_URL: &str = "https://gps.dtc.co.th/ultimate";
const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";
const DEFAULT_DOWNLOAD_DIR: &str = "./downloads";
const DEFAULT_SMTP_RELAY: &str = "smtp.gmail.com";

/// Display name the report mail is sent under.
pub const SENDER_NAME: &str = "DTC DMS Reporter";

/// Fixed shift label appended to the mail subject.
pub const SUBJECT_SUFFIX: &str = "ช่วง1800ถึง0600";

/// Fixed plain-text mail body.
pub const MAIL_BODY: &str =
    "ถึง ผู้เกี่ยวข้อง\nรายงาน DTC DMS กะกลางคืน (18:00 - 06:00)\n\n(Auto-generated email)";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Secret(#[from] SecretError),

    #[error("'{name}' must contain at least one recipient address")]
    NoRecipients { name: String },

    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: String, reason: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Remote console endpoints and login credentials.
#[derive(Debug)]
pub struct ConsoleSettings {
    pub username: String,
    pub password: SecretString,
    pub base_url: String,
}

impl ConsoleSettings {
    pub fn login_url(&self) -> String {
        format!("{}/index.php", self.base_url)
    }

    pub fn report_url(&self) -> String {
        format!("{}/Report/report_other_status.php", self.base_url)
    }
}

/// Outbound mail account, recipients and fixed composition pieces.
#[derive(Debug)]
pub struct MailSettings {
    pub username: String,
    pub password: SecretString,
    pub recipients: Vec<String>,
    pub relay: String,
    pub sender_name: String,
    pub subject_suffix: String,
    pub body: String,
}

/// CSS selectors for the console surface this tool consumes.
#[derive(Debug, Clone)]
pub struct Locators {
    pub username_field: String,
    pub password_field: String,
    pub login_button: String,
    pub start_date_input: String,
    pub end_date_input: String,
    pub asset_scope: String,
    pub category_container: String,
    pub category_input: String,
    pub category_input_fallback: String,
    pub search_control: String,
    pub export_controls: Vec<String>,
}

impl Default for Locators {
    fn default() -> Self {
        Self {
            username_field: "#txtname".into(),
            password_field: "#txtpass".into(),
            login_button: "#btnLogin".into(),
            start_date_input: "#date9".into(),
            end_date_input: "#date10".into(),
            asset_scope: "#ddl_truck".into(),
            category_container: "#s2id_ddlharsh".into(),
            category_input: "#s2id_ddlharsh input".into(),
            category_input_fallback: ".select2-input".into(),
            search_control: "td:nth-of-type(5) > span".into(),
            export_controls: vec!["#btnexport".into(), "button[title=\"Excel\"]".into()],
        }
    }
}

/// Bounded waits and fixed settle delays.
///
/// The two settle delays are deliberate: the console exposes no observable
/// completion signal for report materialization or for the file write, so
/// there is nothing to wait on.
#[derive(Debug, Clone)]
pub struct Timing {
    /// Required-element visibility waits.
    pub element_wait: Duration,
    /// Login-form disappearance wait.
    pub login_wait: Duration,
    /// Category multi-select container wait.
    pub category_wait: Duration,
    /// Search control wait.
    pub search_wait: Duration,
    /// Server-side report materialization settle.
    pub report_settle: Duration,
    /// Download completion settle after the export click.
    pub download_settle: Duration,
    /// Pause after opening the category control and after confirming a match.
    pub keyword_pause: Duration,
    /// Pause for the typed keyword's match to resolve.
    pub keyword_settle: Duration,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            element_wait: Duration::from_secs(60),
            login_wait: Duration::from_secs(60),
            category_wait: Duration::from_secs(30),
            search_wait: Duration::from_secs(10),
            report_settle: Duration::from_secs(120),
            download_settle: Duration::from_secs(30),
            keyword_pause: Duration::from_millis(500),
            keyword_settle: Duration::from_secs(1),
        }
    }
}

/// Fully-resolved run configuration.
#[derive(Debug)]
pub struct Settings {
    pub console: ConsoleSettings,
    pub mail: MailSettings,
    pub webdriver_url: String,
    pub headless: bool,
    pub download_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub utc_offset_hours: i32,
    pub categories: Vec<String>,
    pub locators: Locators,
    pub timing: Timing,
}

impl Settings {
    /// Resolves all settings from the environment.
    ///
    /// Any missing required variable is an error here, before any remote
    /// interaction begins.
    pub fn from_env() -> Result<Self> {
        let console = ConsoleSettings {
            username: require_var(ENV_CONSOLE_USERNAME)?,
            password: resolve_secret(ENV_CONSOLE_PASSWORD)?,
            base_url: env_or("SHIFTREPORT_BASE_URL", DEFAULT_BASE_URL),
        };

        let recipients: Vec<String> = require_var(ENV_MAIL_RECIPIENTS)?
            .split(',')
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if recipients.is_empty() {
            return Err(ConfigError::NoRecipients {
                name: ENV_MAIL_RECIPIENTS.to_string(),
            });
        }

        let mail = MailSettings {
            username: require_var(ENV_MAIL_USER)?,
            password: resolve_secret(ENV_MAIL_PASSWORD)?,
            recipients,
            relay: env_or("SHIFTREPORT_SMTP_RELAY", DEFAULT_SMTP_RELAY),
            sender_name: SENDER_NAME.to_string(),
            subject_suffix: SUBJECT_SUFFIX.to_string(),
            body: MAIL_BODY.to_string(),
        };

        let utc_offset_hours = match std::env::var("SHIFTREPORT_UTC_OFFSET_HOURS") {
            Ok(raw) => raw
                .trim()
                .parse::<i32>()
                .map_err(|e| ConfigError::InvalidValue {
                    name: "SHIFTREPORT_UTC_OFFSET_HOURS".to_string(),
                    reason: e.to_string(),
                })?,
            Err(_) => DEFAULT_UTC_OFFSET_HOURS,
        };

        Ok(Self {
            console,
            mail,
            webdriver_url: env_or("SHIFTREPORT_WEBDRIVER_URL", DEFAULT_WEBDRIVER_URL),
            headless: env_flag("SHIFTREPORT_HEADLESS", true),
            download_dir: PathBuf::from(env_or("SHIFTREPORT_DOWNLOAD_DIR", DEFAULT_DOWNLOAD_DIR)),
            screenshot_dir: PathBuf::from(env_or("SHIFTREPORT_SCREENSHOT_DIR", ".")),
            utc_offset_hours,
            categories: default_categories(),
            locators: Locators::default(),
            timing: Timing::default(),
        })
    }
}

/// The report categories searched and confirmed in the multi-select.
pub fn default_categories() -> Vec<String> {
    vec![
        "ความง่วงระดับ 1".to_string(),
        "ความง่วงระดับ 2".to_string(),
        "หาว".to_string(),
    ]
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_flag(name: &str, default: bool) -> bool {
    match std::env::var(name) {
        Ok(raw) => !matches!(raw.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no"),
        Err(_) => default,
    }
}
