//! Remote console driver abstraction.
//!
//! Every interaction with the remote web console goes through [`UiDriver`].
//! Bounded waits are explicit awaitable conditions with a timeout parameter
//! and one well-defined failure per condition kind; fixed settle delays live
//! in the pipeline, not here. The production implementation speaks WebDriver
//! ([`webdriver::WebDriverConsole`]); tests substitute a scripted fake.

pub mod webdriver;

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DriverError {
    #[error("Element '{selector}' did not become visible within {timeout:?}")]
    ElementNotFound { selector: String, timeout: Duration },

    #[error("Element '{selector}' was still present after {timeout:?}")]
    StillPresent { selector: String, timeout: Duration },

    #[error("No option labelled like {labels:?} in '{selector}'")]
    OptionNotFound {
        selector: String,
        labels: Vec<String>,
    },

    #[error("No element matched '{selector}' for scripted click")]
    ScriptTargetMissing { selector: String },

    #[error("Navigation to '{url}' failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Failed to capture screenshot '{path}': {message}")]
    Screenshot { path: PathBuf, message: String },

    #[error("WebDriver session error: {0}")]
    Session(#[from] thirtyfour::error::WebDriverError),
}

pub type Result<T> = std::result::Result<T, DriverError>;

/// Capability to drive a remote, non-API web console.
#[async_trait]
pub trait UiDriver: Send + Sync {
    /// Loads a page and waits for the document to be available.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Waits until an element matching `selector` is present and displayed.
    async fn wait_visible(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Waits until no element matches `selector` any more.
    async fn wait_gone(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Sends keystrokes into the element matching `selector`.
    async fn type_into(&self, selector: &str, text: &str) -> Result<()>;

    /// Clears an input's value through the page itself, bypassing key events.
    async fn clear_value(&self, selector: &str) -> Result<()>;

    /// Clicks the element matching `selector` with a native click.
    async fn click(&self, selector: &str) -> Result<()>;

    /// Clicks the first selector in `selectors` that matches, via script.
    /// Used for controls that reject native clicks (overlapped export
    /// buttons, login submits behind decorations).
    async fn click_via_script(&self, selectors: &[&str]) -> Result<()>;

    /// Presses Enter on the element matching `selector`.
    async fn press_enter(&self, selector: &str) -> Result<()>;

    /// Waits until the `<select>` at `selector` has a non-empty option list,
    /// then selects the first option whose label contains one of `labels`
    /// (case-insensitive) and raises a `change` event.
    async fn select_option_containing(
        &self,
        selector: &str,
        labels: &[&str],
        timeout: Duration,
    ) -> Result<()>;

    /// Writes a PNG screenshot of the current page to `path`.
    async fn screenshot(&self, path: &Path) -> Result<()>;
}
