//! Advanced Parameters > Import: download every sample CSV and check its header

use std::path::PathBuf;

use async_trait::async_trait;
use backoffice_fixtures::SampleFileKind;

use crate::error::{E2eError, E2eResult};
use crate::files;
use crate::pages::{DashboardPage, ImportPage};
use crate::runner::Suite;
use crate::suite::SuiteContext;
use crate::suites::{go_to_page, login_bo};

pub struct DownloadSampleFiles {
    kinds: Vec<SampleFileKind>,
}

impl DownloadSampleFiles {
    pub const NAME: &'static str = "BO - Advanced Parameters - Import : Download sample csv files";
    pub const BASE_CONTEXT: &'static str = "functional_BO_advancedParameters_import_downloadSampleFiles";

    pub fn new(kinds: Vec<SampleFileKind>) -> Self {
        Self { kinds }
    }

    pub fn all() -> Self {
        Self::new(SampleFileKind::ALL.to_vec())
    }
}

#[async_trait]
impl Suite for DownloadSampleFiles {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_context(&self) -> &str {
        Self::BASE_CONTEXT
    }

    async fn run(&self, ctx: &mut SuiteContext) -> E2eResult<()> {
        login_bo(ctx).await?;

        let import = ImportPage::new(ctx.page(), ctx.config());

        let handle = ctx.begin_case("should go to 'Advanced Parameters > Import' page", "goToImportPage");
        let outcome = go_to_import(ctx, &import).await;
        ctx.finish_case(handle, outcome)?;

        for &kind in &self.kinds {
            let key = kind.type_key();

            let handle = ctx.begin_case(
                &format!("should download {} sample file", key),
                &format!("{}DownloadFile", key),
            );
            let downloaded = download(ctx, &import, kind).await;
            let (path, outcome) = match downloaded {
                Ok(path) => (Some(path), Ok(())),
                Err(e) => (None, Err(e)),
            };
            ctx.finish_case(handle, outcome)?;

            let handle = ctx.begin_case(
                &format!("should check {} sample text file", key),
                &format!("{}checkTextFile", key),
            );
            let outcome = match path {
                Some(path) => files::assert_contains_text(&path, kind.expected_header()).await,
                None => Err(E2eError::AssertionFailed(format!("{} sample file was not downloaded", kind))),
            };
            ctx.finish_case(handle, outcome)?;
        }

        Ok(())
    }
}

async fn go_to_import(ctx: &mut SuiteContext, import: &ImportPage) -> E2eResult<()> {
    go_to_page(
        ctx,
        DashboardPage::ADVANCED_PARAMETERS_LINK,
        DashboardPage::IMPORT_LINK,
        import,
    )
    .await?;
    import.close_sf_toolbar().await
}

async fn download(ctx: &mut SuiteContext, import: &ImportPage, kind: SampleFileKind) -> E2eResult<PathBuf> {
    ctx.require_navigated(&format!("download the {} sample file", kind))?;
    let path = import.download_sample_file(kind).await?;
    files::assert_exists(&path).await?;
    Ok(path)
}
