//! Dashboard and the sidebar menu shared by every back-office screen

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::config::HarnessConfig;
use crate::driver::Page;
use crate::error::E2eResult;
use crate::pages::{BoBasePage, PageObject};

pub struct DashboardPage {
    base: BoBasePage,
}

impl DashboardPage {
    pub const ROUTE: &'static str = "index.php?controller=AdminDashboard";

    pub const CUSTOMERS_PARENT_LINK: &'static str = "li#subtab-AdminParentCustomer";
    pub const ADDRESSES_LINK: &'static str = "li#subtab-AdminAddresses";
    pub const ADVANCED_PARAMETERS_LINK: &'static str = "li#subtab-AdminAdvancedParameters";
    pub const IMPORT_LINK: &'static str = "li#subtab-AdminImport";

    pub fn new(page: Arc<dyn Page>, config: Arc<HarnessConfig>) -> Self {
        Self {
            base: BoBasePage::new(page, config),
        }
    }

    /// Open a sidebar section, then follow one of its links
    pub async fn go_to_sub_menu(&self, parent: &str, link: &str) -> E2eResult<()> {
        debug!("Sidebar: {} > {}", parent, link);
        self.base.page().hover(parent).await?;
        self.base.page().click(parent).await?;
        self.base.wait_for_visible(link).await?;
        self.base
            .click_and_wait_for_navigation(&format!("{} a", link))
            .await
    }
}

#[async_trait]
impl PageObject for DashboardPage {
    fn page_title(&self) -> &'static str {
        "Dashboard"
    }

    async fn goto(&self) -> E2eResult<()> {
        self.base.goto_route(Self::ROUTE).await
    }

    async fn get_page_title(&self) -> E2eResult<String> {
        self.base.get_page_title().await
    }
}
