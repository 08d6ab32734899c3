//! WebDriver-backed console driver.
//!
//! Drives a headless Chrome through a chromedriver endpoint. Downloads are
//! forced into the run's staging directory via Chrome preferences so the
//! export lands where the pipeline expects it.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thirtyfour::prelude::*;
use thirtyfour::Key;
use tokio::time::Instant;
use tracing::debug;

use super::{DriverError, Result, UiDriver};

const POLL_INTERVAL: Duration = Duration::from_millis(500);

pub struct WebDriverConsole {
    driver: WebDriver,
}

impl WebDriverConsole {
    /// Starts a Chrome session against `webdriver_url` with downloads routed
    /// into `download_dir`.
    pub async fn connect(
        webdriver_url: &str,
        download_dir: &Path,
        headless: bool,
    ) -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-setuid-sandbox")?;
        caps.add_arg("--window-size=1920,1080")?;
        if headless {
            caps.add_arg("--headless=new")?;
        }
        caps.add_experimental_option(
            "prefs",
            json!({
                "download.default_directory": download_dir.display().to_string(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
            }),
        )?;

        let driver = WebDriver::new(webdriver_url, caps).await?;
        debug!(webdriver_url, "webdriver session established");
        Ok(Self { driver })
    }

    /// Ends the browser session. Call on every exit path; an abandoned
    /// session leaks a Chrome process on the driver host.
    pub async fn quit(self) -> Result<()> {
        self.driver.quit().await?;
        Ok(())
    }

    async fn find_displayed(&self, selector: &str) -> Option<WebElement> {
        if let Ok(element) = self.driver.find(By::Css(selector)).await {
            if element.is_displayed().await.unwrap_or(false) {
                return Some(element);
            }
        }
        None
    }

    async fn eval_bool(&self, script: &str, args: Vec<serde_json::Value>) -> Result<bool> {
        let ret = self.driver.execute(script, args).await?;
        Ok(ret.json().as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl UiDriver for WebDriverConsole {
    async fn navigate(&self, url: &str) -> Result<()> {
        self.driver
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })
    }

    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.find_displayed(selector).await.is_some() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::ElementNotFound {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn wait_gone(&self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.driver.find(By::Css(selector)).await.is_err() {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(DriverError::StillPresent {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn type_into(&self, selector: &str, text: &str) -> Result<()> {
        let element = self.driver.find(By::Css(selector)).await?;
        element.send_keys(text).await?;
        Ok(())
    }

    async fn clear_value(&self, selector: &str) -> Result<()> {
        self.driver
            .execute(
                "const el = document.querySelector(arguments[0]); if (el) { el.value = ''; }",
                vec![json!(selector)],
            )
            .await?;
        Ok(())
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let element = self.driver.find(By::Css(selector)).await?;
        element.click().await?;
        Ok(())
    }

    async fn click_via_script(&self, selectors: &[&str]) -> Result<()> {
        let clicked = self
            .eval_bool(
                r#"
                for (const selector of arguments[0]) {
                    const el = document.querySelector(selector);
                    if (el) { el.click(); return true; }
                }
                return false;
                "#,
                vec![json!(selectors)],
            )
            .await?;
        if clicked {
            Ok(())
        } else {
            Err(DriverError::ScriptTargetMissing {
                selector: selectors.join(", "),
            })
        }
    }

    async fn press_enter(&self, selector: &str) -> Result<()> {
        let element = self.driver.find(By::Css(selector)).await?;
        element.send_keys(Key::Enter + "").await?;
        Ok(())
    }

    async fn select_option_containing(
        &self,
        selector: &str,
        labels: &[&str],
        timeout: Duration,
    ) -> Result<()> {
        // The control can exist before its option list has been filled in;
        // selecting during that gap silently picks nothing.
        let deadline = Instant::now() + timeout;
        loop {
            let populated = self
                .eval_bool(
                    r#"
                    const sel = document.querySelector(arguments[0]);
                    return !!(sel && sel.options && sel.options.length > 0);
                    "#,
                    vec![json!(selector)],
                )
                .await?;
            if populated {
                break;
            }
            if Instant::now() >= deadline {
                return Err(DriverError::ElementNotFound {
                    selector: selector.to_string(),
                    timeout,
                });
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }

        let selected = self
            .eval_bool(
                r#"
                const sel = document.querySelector(arguments[0]);
                const labels = arguments[1];
                for (let i = 0; i < sel.options.length; i++) {
                    const text = sel.options[i].text;
                    for (const label of labels) {
                        if (text.includes(label)
                            || text.toLowerCase().includes(label.toLowerCase())) {
                            sel.value = sel.options[i].value;
                            sel.dispatchEvent(new Event('change', { bubbles: true }));
                            return true;
                        }
                    }
                }
                return false;
                "#,
                vec![json!(selector), json!(labels)],
            )
            .await?;
        if selected {
            Ok(())
        } else {
            Err(DriverError::OptionNotFound {
                selector: selector.to_string(),
                labels: labels.iter().map(|l| l.to_string()).collect(),
            })
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        self.driver
            .screenshot(path)
            .await
            .map_err(|e| DriverError::Screenshot {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}
