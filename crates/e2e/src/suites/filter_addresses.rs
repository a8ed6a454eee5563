//! Customers > Addresses: filter the grid by every column and reset

use std::path::Path;

use async_trait::async_trait;
use backoffice_fixtures::{FilterCase, FilterCaseSet};
use tracing::info;

use crate::error::E2eResult;
use crate::expander::{self, capture_baseline};
use crate::pages::{AddressesPage, DashboardPage};
use crate::runner::Suite;
use crate::suite::{SuiteContext, SuiteState};
use crate::suites::{go_to_page, login_bo};

pub struct FilterAddresses {
    cases: Vec<FilterCase>,
}

impl FilterAddresses {
    pub const NAME: &'static str = "BO - Customers - Addresses : Filter Addresses table";
    pub const BASE_CONTEXT: &'static str = "functional_BO_customers_addresses_filterAddresses";

    pub fn new(cases: Vec<FilterCase>) -> Self {
        Self { cases }
    }

    /// Cases matching the demo address data
    pub fn demo() -> Self {
        Self::new(FilterCase::address_filters())
    }

    /// Cases loaded from a YAML file, or every YAML file under a directory
    pub fn from_path(path: &Path) -> E2eResult<Self> {
        let sets = if path.is_dir() {
            FilterCaseSet::load_all(path)?
        } else {
            vec![FilterCaseSet::from_file(path)?]
        };
        let cases: Vec<FilterCase> = sets.into_iter().flat_map(|set| set.cases).collect();
        info!("Loaded {} filter case(s) from {}", cases.len(), path.display());
        Ok(Self::new(cases))
    }

    pub fn cases(&self) -> &[FilterCase] {
        &self.cases
    }
}

#[async_trait]
impl Suite for FilterAddresses {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn base_context(&self) -> &str {
        Self::BASE_CONTEXT
    }

    async fn run(&self, ctx: &mut SuiteContext) -> E2eResult<()> {
        login_bo(ctx).await?;

        let addresses = AddressesPage::new(ctx.page(), ctx.config());

        let handle = ctx.begin_case("should go to 'Customers > Addresses' page", "goToAddressesPage");
        let outcome = go_to_page(
            ctx,
            DashboardPage::CUSTOMERS_PARENT_LINK,
            DashboardPage::ADDRESSES_LINK,
            &addresses,
        )
        .await;
        ctx.finish_case(handle, outcome)?;

        let title = "should reset all filters and get number of addresses in BO";
        let handle = ctx.begin_case(title, "resetFirst");
        let baseline = match reset_first(ctx, &addresses).await {
            Ok(count) => {
                ctx.finish_case(handle, Ok(()))?;
                Some(count)
            }
            Err(e) => {
                ctx.finish_case(handle, Err(e))?;
                None
            }
        };

        match baseline {
            Some(baseline) => {
                info!("Baseline: {} address(es)", baseline);
                expander::run_filter_cases(&addresses, ctx, &self.cases, baseline).await
            }
            None => {
                for expanded in expander::expand(&self.cases) {
                    ctx.skip_case(&expanded.title(), &expanded.identifier());
                }
                Ok(())
            }
        }
    }
}

async fn reset_first(ctx: &mut SuiteContext, addresses: &AddressesPage) -> E2eResult<usize> {
    ctx.require_navigated("capture the address baseline")?;
    ctx.advance(SuiteState::Reset)?;
    capture_baseline(addresses).await
}
