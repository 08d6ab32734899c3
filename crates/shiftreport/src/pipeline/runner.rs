use std::sync::Arc;

use secrecy::ExposeSecret;
use tokio::time::sleep;
use tracing::{info, info_span, warn, Instrument};

use crate::convert;
use crate::driver::{DriverError, UiDriver};
use crate::mailer::{Mailer, ReportMessage};
use crate::staging;
use crate::window::ReportWindow;

use super::config::PipelineConfig;
use super::context::PipelineContext;
use super::error::{PipelineError, PipelineWarning};

/// Screenshot written when the export produced no file.
pub const NO_FILE_SCREENSHOT: &str = "final_no_file.png";

/// Screenshot written when any structural step failed.
pub const FAILURE_SCREENSHOT: &str = "error_screenshot.png";

/// Terminal outcome of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Artifact emailed and local files deleted.
    Sent,
    /// Export produced nothing to send.
    NoFile,
    /// A structural step errored.
    Failed,
}

impl PipelineError {
    pub fn outcome(&self) -> RunOutcome {
        match self {
            PipelineError::NoFileProduced => RunOutcome::NoFile,
            _ => RunOutcome::Failed,
        }
    }
}

/// Successful-run summary.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub subject: String,
    pub sent_file: String,
}

/// The report retrieval & transformation pipeline.
///
/// One linear sequence of suspendable steps on one logical task; no retries,
/// no cancellation. Structural failures propagate; best-effort failures are
/// recorded as warnings on the context and the run continues.
pub struct Pipeline {
    config: Arc<PipelineConfig>,
}

impl Pipeline {
    pub fn from_config(config: Arc<PipelineConfig>) -> Self {
        Self { config }
    }

    /// Runs the full pipeline once.
    ///
    /// On a structural failure a diagnostic screenshot is captured before the
    /// error is handed back: `final_no_file.png` when the export produced
    /// nothing, `error_screenshot.png` otherwise.
    pub async fn run(
        &self,
        driver: &dyn UiDriver,
        mailer: &dyn Mailer,
    ) -> (Result<RunReport, PipelineError>, PipelineContext) {
        let mut ctx = PipelineContext::new();
        let span = info_span!("pipeline", run_id = %ctx.run_id);
        let result = self
            .run_inner(driver, mailer, &mut ctx)
            .instrument(span)
            .await;

        if let Err(err) = &result {
            let file_name = match err.outcome() {
                RunOutcome::NoFile => NO_FILE_SCREENSHOT,
                _ => FAILURE_SCREENSHOT,
            };
            let path = self.config.screenshot_dir.join(file_name);
            match driver.screenshot(&path).await {
                Ok(()) => info!(screenshot = %path.display(), "diagnostic screenshot captured"),
                Err(shot_err) => {
                    warn!(error = %shot_err, "failed to capture diagnostic screenshot")
                }
            }
        }

        (result, ctx)
    }

    async fn run_inner(
        &self,
        driver: &dyn UiDriver,
        mailer: &dyn Mailer,
        ctx: &mut PipelineContext,
    ) -> Result<RunReport, PipelineError> {
        // First force-clean: no stale file can predate the run.
        staging::reset(&self.config.staging_dir)?;

        self.step_login(driver)
            .instrument(info_span!("login"))
            .await?;

        self.step_configure_query(driver, ctx)
            .instrument(info_span!("configure_query"))
            .await?;

        self.step_trigger_search(driver, ctx)
            .instrument(info_span!("trigger_search"))
            .await;

        self.step_export(driver, ctx)
            .instrument(info_span!("export"))
            .await?;

        {
            let _step = info_span!("convert").entered();
            self.step_convert(ctx);
        }

        let (subject, sent_file) = self
            .step_dispatch(mailer, ctx)
            .instrument(info_span!("dispatch"))
            .await?;

        {
            let _step = info_span!("cleanup").entered();
            self.step_cleanup(ctx);
        }

        info!(subject = %subject, warnings = ctx.warnings.len(), "run complete");
        Ok(RunReport {
            outcome: RunOutcome::Sent,
            subject,
            sent_file,
        })
    }

    /// Logs into the console. Success is the login form going away; a single
    /// failed attempt is fatal for the whole run.
    async fn step_login(&self, driver: &dyn UiDriver) -> Result<(), PipelineError> {
        let locators = &self.config.locators;
        let timing = &self.config.timing;

        driver
            .navigate(&self.config.login_url)
            .await
            .map_err(PipelineError::Login)?;
        driver
            .wait_visible(&locators.username_field, timing.element_wait)
            .await
            .map_err(PipelineError::Login)?;
        driver
            .type_into(&locators.username_field, &self.config.console_username)
            .await
            .map_err(PipelineError::Login)?;
        driver
            .type_into(
                &locators.password_field,
                self.config.console_password.expose_secret(),
            )
            .await
            .map_err(PipelineError::Login)?;
        driver
            .click_via_script(&[locators.login_button.as_str()])
            .await
            .map_err(PipelineError::Login)?;
        driver
            .wait_gone(&locators.username_field, timing.login_wait)
            .await
            .map_err(PipelineError::Login)?;

        info!("login succeeded");
        Ok(())
    }

    /// Navigates to the report page, selects the all-assets scope, selects
    /// the report categories (best-effort) and fills the shift window.
    async fn step_configure_query(
        &self,
        driver: &dyn UiDriver,
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        let locators = &self.config.locators;
        let timing = &self.config.timing;

        driver
            .navigate(&self.config.report_url)
            .await
            .map_err(PipelineError::Navigation)?;
        driver
            .wait_visible(&locators.start_date_input, timing.element_wait)
            .await
            .map_err(PipelineError::Navigation)?;

        driver
            .wait_visible(&locators.asset_scope, timing.element_wait)
            .await
            .map_err(PipelineError::QueryConfiguration)?;
        driver
            .select_option_containing(&locators.asset_scope, &["ทั้งหมด", "all"], timing.element_wait)
            .await
            .map_err(PipelineError::QueryConfiguration)?;
        info!("asset scope set to all");

        self.step_select_categories(driver, ctx).await;

        let window = ReportWindow::for_now(self.config.site_offset);
        info!(start = %window.start_field(), end = %window.end_field(), "filling report window");

        driver
            .clear_value(&locators.start_date_input)
            .await
            .map_err(PipelineError::QueryConfiguration)?;
        driver
            .type_into(&locators.start_date_input, &window.start_field())
            .await
            .map_err(PipelineError::QueryConfiguration)?;
        driver
            .clear_value(&locators.end_date_input)
            .await
            .map_err(PipelineError::QueryConfiguration)?;
        driver
            .type_into(&locators.end_date_input, &window.end_field())
            .await
            .map_err(PipelineError::QueryConfiguration)?;

        ctx.window = Some(window);
        Ok(())
    }

    /// Best-effort: a missing category narrows the report, it does not sink
    /// the run.
    async fn step_select_categories(&self, driver: &dyn UiDriver, ctx: &mut PipelineContext) {
        let locators = &self.config.locators;
        let timing = &self.config.timing;

        if let Err(e) = driver
            .wait_visible(&locators.category_container, timing.category_wait)
            .await
        {
            warn!(error = %e, "category control unavailable, skipping category selection");
            ctx.warnings.push(PipelineWarning::CategoryControlUnavailable {
                error: e.to_string(),
            });
            return;
        }

        for keyword in &self.config.categories {
            match self.select_category(driver, keyword).await {
                Ok(()) => info!(keyword = %keyword, "category selected"),
                Err(e) => {
                    warn!(keyword = %keyword, error = %e, "category selection skipped");
                    ctx.warnings.push(PipelineWarning::CategorySelection {
                        keyword: keyword.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
    }

    async fn select_category(
        &self,
        driver: &dyn UiDriver,
        keyword: &str,
    ) -> Result<(), DriverError> {
        let locators = &self.config.locators;
        let timing = &self.config.timing;

        driver.click(&locators.category_container).await?;
        sleep(timing.keyword_pause).await;

        // The search input the multi-select renders varies; fall back to the
        // generic class when the container-scoped lookup misses.
        let input = if driver
            .type_into(&locators.category_input, keyword)
            .await
            .is_ok()
        {
            locators.category_input.as_str()
        } else {
            driver
                .type_into(&locators.category_input_fallback, keyword)
                .await?;
            locators.category_input_fallback.as_str()
        };

        sleep(timing.keyword_settle).await;
        driver.press_enter(input).await?;
        sleep(timing.keyword_pause).await;
        Ok(())
    }

    /// Best-effort: if the search control cannot be clicked the export is
    /// still attempted and will fail downstream if no report is ready.
    async fn step_trigger_search(&self, driver: &dyn UiDriver, ctx: &mut PipelineContext) {
        let locators = &self.config.locators;
        let timing = &self.config.timing;

        let attempt: Result<(), DriverError> = async {
            driver
                .wait_visible(&locators.search_control, timing.search_wait)
                .await?;
            driver.click(&locators.search_control).await
        }
        .await;

        match attempt {
            Ok(()) => {
                // No completion signal is observable for server-side report
                // materialization; the settle delay stands in for one.
                info!(settle = ?timing.report_settle, "search submitted, waiting for report");
                sleep(timing.report_settle).await;
            }
            Err(e) => {
                warn!(error = %e, "could not trigger search, attempting export anyway");
                ctx.warnings
                    .push(PipelineWarning::SearchTrigger { error: e.to_string() });
            }
        }
    }

    /// Triggers the export and resolves the downloaded file. The staging
    /// directory is force-reset immediately beforehand so the newest
    /// non-hidden entry is necessarily this run's export.
    async fn step_export(
        &self,
        driver: &dyn UiDriver,
        ctx: &mut PipelineContext,
    ) -> Result<(), PipelineError> {
        let locators = &self.config.locators;
        let timing = &self.config.timing;

        staging::reset(&self.config.staging_dir)?;

        let combined = locators.export_controls.join(", ");
        driver
            .wait_visible(&combined, timing.element_wait)
            .await
            .map_err(PipelineError::Export)?;
        let selectors: Vec<&str> = locators.export_controls.iter().map(String::as_str).collect();
        driver
            .click_via_script(&selectors)
            .await
            .map_err(PipelineError::Export)?;

        info!(settle = ?timing.download_settle, "export clicked, waiting for download");
        sleep(timing.download_settle).await;

        match staging::latest_download(&self.config.staging_dir)? {
            Some(staged) => {
                info!(file = %staged.file_name, "export staged");
                ctx.staged = Some(staged);
                Ok(())
            }
            None => Err(PipelineError::NoFileProduced),
        }
    }

    /// Best-effort: a conversion failure falls back to sending the raw
    /// export unchanged.
    fn step_convert(&self, ctx: &mut PipelineContext) {
        let staged = ctx.staged.as_ref().expect("export step completed");
        match convert::convert_export(&staged.path) {
            Ok(artifact) => {
                info!(file = %artifact.file_name, "export converted");
                ctx.converted = Some(artifact);
            }
            Err(e) => {
                warn!(error = %e, "conversion failed, sending raw export");
                ctx.warnings
                    .push(PipelineWarning::Conversion { error: e.to_string() });
            }
        }
    }

    /// Sends the converted artifact, or the raw export when conversion
    /// failed. The subject always carries the raw export's name.
    async fn step_dispatch(
        &self,
        mailer: &dyn Mailer,
        ctx: &mut PipelineContext,
    ) -> Result<(String, String), PipelineError> {
        let staged = ctx.staged.as_ref().expect("export step completed");
        let (attachment_path, attachment_name) = match &ctx.converted {
            Some(artifact) => (artifact.path.clone(), artifact.file_name.clone()),
            None => (staged.path.clone(), staged.file_name.clone()),
        };

        let subject = format!("{} {}", staged.file_name, self.config.subject_suffix);
        let message = ReportMessage {
            recipients: self.config.recipients.clone(),
            subject: subject.clone(),
            body: self.config.mail_body.clone(),
            attachment_path,
            attachment_name: attachment_name.clone(),
        };

        mailer.send(&message).await?;
        info!(subject = %subject, "report dispatched");
        Ok((subject, attachment_name))
    }

    /// Best-effort: leftover local artifacts are an annoyance, not a failure.
    fn step_cleanup(&self, ctx: &mut PipelineContext) {
        let mut paths = Vec::new();
        if let Some(staged) = &ctx.staged {
            paths.push(staged.path.clone());
        }
        if let Some(artifact) = &ctx.converted {
            paths.push(artifact.path.clone());
        }

        for path in paths {
            match std::fs::remove_file(&path) {
                Ok(()) => info!(path = %path.display(), "artifact deleted"),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "cleanup failed");
                    ctx.warnings.push(PipelineWarning::Cleanup {
                        path,
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}
