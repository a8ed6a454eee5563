//! Harness configuration
//!
//! Defaults, overridden by an optional YAML file, then by the
//! environment variables the shop's CI already exports.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::playwright::{BrowserKind, PlaywrightConfig};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Back-office base URL, admin folder included
    pub base_url: String,

    /// Administrator credentials
    pub email: String,
    pub password: String,

    pub browser: BrowserConfig,

    /// Directory the browser saves downloads into
    pub download_dir: PathBuf,

    /// Directory for test-results.json
    pub output_dir: PathBuf,

    pub timeouts: TimeoutConfig,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/admin-dev/".to_string(),
            email: "demo@prestashop.com".to_string(),
            password: "prestashop_demo".to_string(),
            browser: BrowserConfig::default(),
            download_dir: PathBuf::from("test-results/downloads"),
            output_dir: PathBuf::from("test-results"),
            timeouts: TimeoutConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    pub kind: BrowserKind,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    /// Delay inserted by Playwright between actions
    pub slow_mo_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            kind: BrowserKind::Chromium,
            headless: true,
            viewport_width: 1680,
            viewport_height: 900,
            slow_mo_ms: 0,
        }
    }
}

/// Timeouts, in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub navigation_ms: u64,
    pub action_ms: u64,
    pub download_ms: u64,
    pub file_poll_ms: u64,
    pub health_check_ms: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            navigation_ms: 30_000,
            action_ms: 10_000,
            download_ms: 5_000,
            file_poll_ms: 100,
            health_check_ms: 30_000,
        }
    }
}

impl TimeoutConfig {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn action(&self) -> Duration {
        Duration::from_millis(self.action_ms)
    }

    pub fn download(&self) -> Duration {
        Duration::from_millis(self.download_ms)
    }

    pub fn file_poll(&self) -> Duration {
        Duration::from_millis(self.file_poll_ms)
    }

    pub fn health_check(&self) -> Duration {
        Duration::from_millis(self.health_check_ms)
    }

    /// Longest wait the browser may be asked to block on
    pub fn longest_browser_wait(&self) -> Duration {
        Duration::from_millis(self.navigation_ms.max(self.action_ms).max(self.download_ms))
    }
}

/// Headroom the bridge allows on top of the browser's own deadline, so a
/// browser-side timeout is always reported before the bridge gives up
const BRIDGE_MARGIN: Duration = Duration::from_secs(10);

impl HarnessConfig {
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Defaults, then `path` if given, then the process environment
    pub fn load(path: Option<&Path>) -> E2eResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `URL_BO`, `LOGIN`, `PASSWD`, `BROWSER`,
    /// `HEADLESS` and `DOWNLOAD_DIR`
    pub fn apply_env<F>(&mut self, lookup: F) -> E2eResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("URL_BO") {
            debug!("base_url overridden by URL_BO");
            self.base_url = url;
        }
        if let Some(email) = lookup("LOGIN") {
            self.email = email;
        }
        if let Some(password) = lookup("PASSWD") {
            self.password = password;
        }
        if let Some(browser) = lookup("BROWSER") {
            self.browser.kind = browser.parse()?;
        }
        if let Some(headless) = lookup("HEADLESS") {
            self.browser.headless = parse_bool("HEADLESS", &headless)?;
        }
        if let Some(dir) = lookup("DOWNLOAD_DIR") {
            self.download_dir = PathBuf::from(dir);
        }
        Ok(())
    }

    pub fn validate(&self) -> E2eResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(E2eError::Config(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.email.is_empty() || self.password.is_empty() {
            return Err(E2eError::Config("admin credentials are empty".to_string()));
        }
        if self.timeouts.file_poll_ms == 0 || self.timeouts.file_poll_ms > self.timeouts.download_ms {
            return Err(E2eError::Config(
                "file_poll_ms must be non-zero and at most download_ms".to_string(),
            ));
        }
        Ok(())
    }

    /// Driver settings derived from the browser and timeout sections
    pub fn playwright(&self) -> PlaywrightConfig {
        let defaults = PlaywrightConfig::default();
        let request_timeout = defaults
            .request_timeout
            .max(self.timeouts.longest_browser_wait() + BRIDGE_MARGIN);
        PlaywrightConfig {
            browser: self.browser.kind,
            headless: self.browser.headless,
            slow_mo_ms: self.browser.slow_mo_ms,
            action_timeout: self.timeouts.action(),
            navigation_timeout: self.timeouts.navigation(),
            request_timeout,
            ..defaults
        }
    }

    /// Absolute URL for a back-office route
    pub fn url(&self, route: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            route.trim_start_matches('/')
        )
    }
}

fn parse_bool(key: &str, value: &str) -> E2eResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(E2eError::Config(format!("{} must be a boolean, got '{}'", key, other))),
    }
}
