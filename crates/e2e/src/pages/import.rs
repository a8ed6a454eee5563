//! Advanced Parameters > Import

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use backoffice_fixtures::SampleFileKind;
use tracing::info;

use crate::config::HarnessConfig;
use crate::driver::Page;
use crate::error::E2eResult;
use crate::files;
use crate::pages::{BoBasePage, PageObject};

pub const SAMPLE_FILES_TOGGLE: &str = "#download-sample-file-dropdown";

pub struct ImportPage {
    base: BoBasePage,
}

impl ImportPage {
    pub const ROUTE: &'static str = "index.php/configure/advanced/import/";

    pub fn new(page: Arc<dyn Page>, config: Arc<HarnessConfig>) -> Self {
        Self {
            base: BoBasePage::new(page, config),
        }
    }

    pub fn sample_link_selector(kind: SampleFileKind) -> String {
        format!("a[href*='sample/download/{}']", kind.type_key())
    }

    pub async fn close_sf_toolbar(&self) -> E2eResult<()> {
        self.base.close_sf_toolbar().await
    }

    /// Download a sample file and return its local path once it is on
    /// disk; fails with `Timeout` past the configured download timeout
    pub async fn download_sample_file(&self, kind: SampleFileKind) -> E2eResult<PathBuf> {
        let config = self.base.config();
        let timeouts = &config.timeouts;

        tokio::fs::create_dir_all(&config.download_dir).await?;

        self.base.page().click(SAMPLE_FILES_TOGGLE).await?;
        let link = Self::sample_link_selector(kind);
        self.base.wait_for_visible(&link).await?;

        let path = self
            .base
            .page()
            .click_and_download(&link, &config.download_dir, timeouts.download())
            .await?;
        files::wait_for_file(&path, timeouts.download(), timeouts.file_poll()).await?;

        info!("Downloaded {} sample file to {}", kind, path.display());
        Ok(path)
    }
}

#[async_trait]
impl PageObject for ImportPage {
    fn page_title(&self) -> &'static str {
        "Import"
    }

    async fn goto(&self) -> E2eResult<()> {
        self.base.goto_route(Self::ROUTE).await
    }

    async fn get_page_title(&self) -> E2eResult<String> {
        self.base.get_page_title().await
    }
}
