//! Functional suites and the steps they share

mod download_sample_files;
mod filter_addresses;

use std::fmt;
use std::str::FromStr;

use crate::error::{E2eError, E2eResult};
use crate::pages::{DashboardPage, LoginPage, PageObject};
use crate::runner::Suite;
use crate::suite::{SuiteContext, SuiteState};

pub use download_sample_files::DownloadSampleFiles;
pub use filter_addresses::FilterAddresses;

/// Which suites a run should include
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteSelection {
    All,
    FilterAddresses,
    DownloadSampleFiles,
}

impl SuiteSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteSelection::All => "all",
            SuiteSelection::FilterAddresses => "filter-addresses",
            SuiteSelection::DownloadSampleFiles => "download-sample-files",
        }
    }

    pub fn includes(&self, other: SuiteSelection) -> bool {
        *self == SuiteSelection::All || *self == other
    }
}

impl fmt::Display for SuiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SuiteSelection {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(SuiteSelection::All),
            "filter-addresses" | "filterAddresses" => Ok(SuiteSelection::FilterAddresses),
            "download-sample-files" | "downloadSampleFiles" => Ok(SuiteSelection::DownloadSampleFiles),
            other => Err(E2eError::Config(format!("unknown suite '{}'", other))),
        }
    }
}

/// Build the suites a selection names, in run order
pub fn select(selection: SuiteSelection, filter_addresses: FilterAddresses) -> Vec<Box<dyn Suite>> {
    let mut suites: Vec<Box<dyn Suite>> = Vec::new();
    if selection.includes(SuiteSelection::FilterAddresses) {
        suites.push(Box::new(filter_addresses));
    }
    if selection.includes(SuiteSelection::DownloadSampleFiles) {
        suites.push(Box::new(DownloadSampleFiles::all()));
    }
    suites
}

/// The "should login in BO" step every suite starts with
pub async fn login_bo(ctx: &mut SuiteContext) -> E2eResult<()> {
    let handle = ctx.begin_case("should login in BO", "loginBO");
    let outcome = login(ctx).await;
    ctx.finish_case(handle, outcome)
}

async fn login(ctx: &mut SuiteContext) -> E2eResult<()> {
    let config = ctx.config();
    let login_page = LoginPage::new(ctx.page(), config.clone());
    let dashboard = DashboardPage::new(ctx.page(), config.clone());

    login_page.goto().await?;
    login_page.login(&config.email, &config.password).await?;
    expect_title(&dashboard).await?;
    ctx.advance(SuiteState::LoggedIn)
}

/// Open a sidebar entry from the dashboard and check the landing screen
pub async fn go_to_page<P: PageObject>(
    ctx: &mut SuiteContext,
    parent: &str,
    link: &str,
    target: &P,
) -> E2eResult<()> {
    ctx.require_logged_in(&format!("open {}", target.page_title()))?;

    let dashboard = DashboardPage::new(ctx.page(), ctx.config());
    dashboard.go_to_sub_menu(parent, link).await?;
    expect_title(target).await?;

    if ctx.state() == SuiteState::LoggedIn {
        ctx.advance(SuiteState::Navigated)?;
    }
    Ok(())
}

/// The browser title must contain the screen's expected title
pub async fn expect_title<P: PageObject + ?Sized>(target: &P) -> E2eResult<()> {
    let title = target.get_page_title().await?;
    if title.contains(target.page_title()) {
        Ok(())
    } else {
        Err(E2eError::AssertionFailed(format!(
            "page title '{}' does not contain '{}'",
            title,
            target.page_title()
        )))
    }
}
