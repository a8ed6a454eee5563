//! Page objects for the back-office screens
//!
//! Each screen wraps the suite's tab and exposes semantic operations
//! built from the driver primitives. Selectors stay inside the page
//! objects; suites only see operations.

pub mod addresses;
pub mod dashboard;
pub mod grid;
pub mod import;
pub mod login;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use crate::config::HarnessConfig;
use crate::driver::{Page, WaitState};
use crate::error::{E2eError, E2eResult};

pub use addresses::AddressesPage;
pub use dashboard::DashboardPage;
pub use grid::{Grid, GridSnapshot};
pub use import::ImportPage;
pub use login::LoginPage;

/// Capabilities shared by every screen
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Text the browser title contains once the screen is loaded
    fn page_title(&self) -> &'static str;

    /// Navigate straight to the screen
    async fn goto(&self) -> E2eResult<()>;

    async fn get_page_title(&self) -> E2eResult<String>;
}

/// Symfony debug toolbar shown on dev installs
pub const SF_TOOLBAR_HIDE_BUTTON: &str = "a[id*='sfToolbarHideButton']";

/// Primitives shared by the page objects
#[derive(Clone)]
pub struct BoBasePage {
    page: Arc<dyn Page>,
    config: Arc<HarnessConfig>,
}

impl BoBasePage {
    pub fn new(page: Arc<dyn Page>, config: Arc<HarnessConfig>) -> Self {
        Self { page, config }
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub async fn goto_route(&self, route: &str) -> E2eResult<()> {
        self.page.goto(&self.config.url(route)).await
    }

    pub async fn get_page_title(&self) -> E2eResult<String> {
        self.page.title().await
    }

    /// Trimmed text content of the first match
    pub async fn get_text(&self, selector: &str) -> E2eResult<String> {
        Ok(self.page.text_content(selector).await?.trim().to_string())
    }

    pub async fn set_value(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.wait_for_visible(selector).await?;
        self.page.fill(selector, value).await
    }

    pub async fn select_by_visible_text(&self, selector: &str, label: &str) -> E2eResult<()> {
        self.wait_for_visible(selector).await?;
        self.page.select_option(selector, label).await
    }

    pub async fn wait_for_visible(&self, selector: &str) -> E2eResult<()> {
        self.page
            .wait_for_selector(selector, WaitState::Visible, self.action_timeout())
            .await
    }

    pub async fn click_and_wait_for_navigation(&self, selector: &str) -> E2eResult<()> {
        self.page
            .click_and_wait_for_navigation(selector, self.navigation_timeout())
            .await
    }

    pub async fn element_visible(&self, selector: &str) -> E2eResult<bool> {
        self.page.is_visible(selector).await
    }

    /// Number shown in parentheses in an element, e.g. `Addresses (12)`
    pub async fn get_number_from_text(&self, selector: &str) -> E2eResult<usize> {
        let text = self.get_text(selector).await?;
        parse_count(&text).ok_or_else(|| {
            E2eError::NotFound(format!("row count in '{}' ({})", text, selector))
        })
    }

    /// Hide the Symfony debug toolbar if present, it overlaps grid buttons
    pub async fn close_sf_toolbar(&self) -> E2eResult<()> {
        if self.page.is_visible(SF_TOOLBAR_HIDE_BUTTON).await? {
            self.page.click(SF_TOOLBAR_HIDE_BUTTON).await?;
        }
        Ok(())
    }

    fn action_timeout(&self) -> Duration {
        self.config.timeouts.action()
    }

    fn navigation_timeout(&self) -> Duration {
        self.config.timeouts.navigation()
    }
}

/// Extract the first parenthesised integer from a grid header
pub fn parse_count(text: &str) -> Option<usize> {
    static COUNT: OnceLock<Regex> = OnceLock::new();
    let re = COUNT.get_or_init(|| Regex::new(r"\((\d+)\)").expect("count pattern is valid"));
    re.captures(text)?.get(1)?.as_str().parse().ok()
}
