use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use shiftreport::driver::webdriver::WebDriverConsole;
use shiftreport::mailer::SmtpMailer;
use shiftreport::pipeline::{Pipeline, PipelineConfig};
use shiftreport::Settings;

#[tokio::main]
async fn main() -> ExitCode {
    // Local development convenience; deployments inject real env vars.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting shiftreport v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => {
            error!("Missing or invalid configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Chrome is handed the staging path as a preference string, so it must
    // exist and be absolute before the session starts.
    if let Err(e) = std::fs::create_dir_all(&settings.download_dir) {
        error!(path = %settings.download_dir.display(), "Cannot create staging directory: {e}");
        return ExitCode::FAILURE;
    }
    match std::fs::canonicalize(&settings.download_dir) {
        Ok(absolute) => settings.download_dir = absolute,
        Err(e) => {
            error!(path = %settings.download_dir.display(), "Cannot resolve staging directory: {e}");
            return ExitCode::FAILURE;
        }
    }

    let mailer = match SmtpMailer::new(
        &settings.mail.relay,
        &settings.mail.sender_name,
        &settings.mail.username,
        &settings.mail.password,
    ) {
        Ok(mailer) => mailer,
        Err(e) => {
            error!("Could not set up mail transport: {e}");
            return ExitCode::FAILURE;
        }
    };

    let driver = match WebDriverConsole::connect(
        &settings.webdriver_url,
        &settings.download_dir,
        settings.headless,
    )
    .await
    {
        Ok(driver) => driver,
        Err(e) => {
            error!("Could not start browser session: {e}");
            return ExitCode::FAILURE;
        }
    };

    let pipeline = Pipeline::from_config(Arc::new(PipelineConfig::from_settings(settings)));
    let (result, ctx) = pipeline.run(&driver, &mailer).await;

    if let Err(e) = driver.quit().await {
        warn!("Failed to end browser session: {e}");
    }

    match result {
        Ok(report) => {
            info!(
                subject = %report.subject,
                file = %report.sent_file,
                warnings = ctx.warnings.len(),
                "Report sent"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(outcome = ?e.outcome(), "Run failed: {e}");
            ExitCode::FAILURE
        }
    }
}
