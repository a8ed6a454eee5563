//! Browser automation seam
//!
//! The harness never talks to a browser directly: it goes through these
//! traits. [`crate::playwright`] implements them on top of Playwright;
//! tests implement them with an in-memory back office.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::E2eResult;

/// Element state to wait for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitState {
    #[default]
    Visible,
    Hidden,
    Attached,
    Detached,
}

impl WaitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WaitState::Visible => "visible",
            WaitState::Hidden => "hidden",
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
        }
    }
}

/// Options applied to a new browsing context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextOptions {
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub accept_downloads: bool,
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self {
            viewport_width: 1680,
            viewport_height: 900,
            accept_downloads: true,
        }
    }
}

#[async_trait]
pub trait Browser: Send + Sync {
    /// Allocate an isolated session (own cookies and storage)
    async fn new_context(&self, options: &ContextOptions) -> E2eResult<Arc<dyn BrowserContext>>;

    async fn close(&self) -> E2eResult<()>;
}

#[async_trait]
pub trait BrowserContext: Send + Sync {
    fn id(&self) -> &str;

    async fn new_page(&self) -> E2eResult<Arc<dyn Page>>;

    /// Release every page and all storage owned by the context
    async fn close(&self) -> E2eResult<()>;
}

/// A single navigable tab
#[async_trait]
pub trait Page: Send + Sync {
    async fn goto(&self, url: &str) -> E2eResult<()>;

    async fn url(&self) -> E2eResult<String>;

    async fn title(&self) -> E2eResult<String>;

    async fn click(&self, selector: &str) -> E2eResult<()>;

    async fn hover(&self, selector: &str) -> E2eResult<()>;

    /// Replace the value of an input
    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()>;

    /// Pick a dropdown option by its visible label
    async fn select_option(&self, selector: &str, label: &str) -> E2eResult<()>;

    async fn text_content(&self, selector: &str) -> E2eResult<String>;

    async fn count(&self, selector: &str) -> E2eResult<usize>;

    async fn is_visible(&self, selector: &str) -> E2eResult<bool>;

    async fn wait_for_selector(&self, selector: &str, state: WaitState, timeout: Duration) -> E2eResult<()>;

    /// Click and resolve once the resulting navigation has loaded
    async fn click_and_wait_for_navigation(&self, selector: &str, timeout: Duration) -> E2eResult<()>;

    /// Click a download link, save the file into `dir` and return its path
    async fn click_and_download(&self, selector: &str, dir: &Path, timeout: Duration) -> E2eResult<PathBuf>;
}
