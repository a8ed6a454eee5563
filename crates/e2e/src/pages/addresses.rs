//! Customers > Addresses

use std::sync::Arc;

use async_trait::async_trait;
use backoffice_fixtures::FilterKind;

use crate::config::HarnessConfig;
use crate::driver::Page;
use crate::error::E2eResult;
use crate::expander::FilterableGrid;
use crate::pages::{BoBasePage, Grid, GridSnapshot, PageObject};

pub struct AddressesPage {
    base: BoBasePage,
    grid: Grid,
}

impl AddressesPage {
    pub const ROUTE: &'static str = "index.php/sell/addresses/";
    pub const GRID_ID: &'static str = "address";

    /// Columns displayed by the addresses grid
    pub const COLUMNS: [&'static str; 7] = [
        "id_address",
        "firstname",
        "lastname",
        "address1",
        "postcode",
        "city",
        "country_name",
    ];

    pub fn new(page: Arc<dyn Page>, config: Arc<HarnessConfig>) -> Self {
        let base = BoBasePage::new(page, config);
        let grid = Grid::new(base.clone(), Self::GRID_ID);
        Self { base, grid }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub async fn filter_addresses(&self, kind: FilterKind, column: &str, value: &str) -> E2eResult<()> {
        self.grid.filter(kind, column, value).await
    }

    pub async fn reset_and_get_number_of_lines(&self) -> E2eResult<usize> {
        self.grid.reset_and_get_number_of_lines().await
    }

    pub async fn get_number_of_element_in_grid(&self) -> E2eResult<usize> {
        self.grid.number_of_rows().await
    }

    pub async fn get_text_column_from_table(&self, row: usize, column: &str) -> E2eResult<String> {
        self.grid.text_column(row, column).await
    }

    pub async fn snapshot(&self) -> E2eResult<GridSnapshot> {
        self.grid.snapshot(&Self::COLUMNS).await
    }
}

#[async_trait]
impl PageObject for AddressesPage {
    fn page_title(&self) -> &'static str {
        "Addresses"
    }

    async fn goto(&self) -> E2eResult<()> {
        self.base.goto_route(Self::ROUTE).await
    }

    async fn get_page_title(&self) -> E2eResult<String> {
        self.base.get_page_title().await
    }
}

#[async_trait]
impl FilterableGrid for AddressesPage {
    async fn filter(&self, kind: FilterKind, column: &str, value: &str) -> E2eResult<()> {
        self.filter_addresses(kind, column, value).await
    }

    async fn row_count(&self) -> E2eResult<usize> {
        self.get_number_of_element_in_grid().await
    }

    async fn read_cell(&self, row: usize, column: &str) -> E2eResult<String> {
        self.get_text_column_from_table(row, column).await
    }

    async fn reset_and_count_rows(&self) -> E2eResult<usize> {
        self.reset_and_get_number_of_lines().await
    }
}
