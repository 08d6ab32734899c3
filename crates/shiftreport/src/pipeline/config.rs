use std::path::PathBuf;

use chrono::FixedOffset;
use secrecy::SecretString;

use crate::config::{Locators, Settings, Timing};
use crate::window::site_offset;

/// Everything one pipeline run needs, extracted from [`Settings`] once and
/// owned for the lifetime of the run.
pub struct PipelineConfig {
    pub login_url: String,
    pub report_url: String,
    pub console_username: String,
    pub console_password: SecretString,
    pub locators: Locators,
    pub timing: Timing,
    pub categories: Vec<String>,
    pub staging_dir: PathBuf,
    pub screenshot_dir: PathBuf,
    pub site_offset: FixedOffset,
    pub recipients: Vec<String>,
    pub subject_suffix: String,
    pub mail_body: String,
}

impl PipelineConfig {
    pub fn from_settings(settings: Settings) -> Self {
        let login_url = settings.console.login_url();
        let report_url = settings.console.report_url();
        Self {
            login_url,
            report_url,
            console_username: settings.console.username,
            console_password: settings.console.password,
            locators: settings.locators,
            timing: settings.timing,
            categories: settings.categories,
            staging_dir: settings.download_dir,
            screenshot_dir: settings.screenshot_dir,
            site_offset: site_offset(settings.utc_offset_hours),
            recipients: settings.mail.recipients,
            subject_suffix: settings.mail.subject_suffix,
            mail_body: settings.mail.body,
        }
    }
}
