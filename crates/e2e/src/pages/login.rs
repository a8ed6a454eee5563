//! Back-office login screen

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::HarnessConfig;
use crate::driver::Page;
use crate::error::E2eResult;
use crate::pages::{BoBasePage, PageObject};

pub const EMAIL_INPUT: &str = "#email";
pub const PASSWORD_INPUT: &str = "#passwd";
pub const SUBMIT_BUTTON: &str = "#submit_login";

pub struct LoginPage {
    base: BoBasePage,
}

impl LoginPage {
    pub const ROUTE: &'static str = "index.php?controller=AdminLogin";

    pub fn new(page: Arc<dyn Page>, config: Arc<HarnessConfig>) -> Self {
        Self {
            base: BoBasePage::new(page, config),
        }
    }

    /// Fill the credentials and submit; resolves once the next page loaded
    pub async fn login(&self, email: &str, password: &str) -> E2eResult<()> {
        self.base.set_value(EMAIL_INPUT, email).await?;
        self.base.set_value(PASSWORD_INPUT, password).await?;
        self.base.click_and_wait_for_navigation(SUBMIT_BUTTON).await?;
        info!("Logged in as {}", email);
        Ok(())
    }
}

#[async_trait]
impl PageObject for LoginPage {
    fn page_title(&self) -> &'static str {
        "PrestaShop"
    }

    async fn goto(&self) -> E2eResult<()> {
        self.base.goto_route(Self::ROUTE).await
    }

    async fn get_page_title(&self) -> E2eResult<String> {
        self.base.get_page_title().await
    }
}
