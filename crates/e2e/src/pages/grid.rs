//! Administrative list views ("grids")
//!
//! A grid is identified by its id prefix (`address`, `customer`, ...)
//! and has one filter control per column, a search and a reset button,
//! and a header carrying the number of matching rows.

use std::collections::BTreeMap;

use async_trait::async_trait;
use backoffice_fixtures::FilterKind;
use tracing::debug;

use crate::error::{E2eError, E2eResult};
use crate::expander::FilterableGrid;
use crate::pages::BoBasePage;

#[derive(Clone)]
pub struct Grid {
    base: BoBasePage,
    id: String,
}

impl Grid {
    pub fn new(base: BoBasePage, id: &str) -> Self {
        Self {
            base,
            id: id.to_string(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title_selector(&self) -> String {
        format!("#{}_grid_panel h3.card-header-title", self.id)
    }

    pub fn table_selector(&self) -> String {
        format!("#{}_grid_table", self.id)
    }

    /// Data rows, excluding the "no records" placeholder
    pub fn rows_selector(&self) -> String {
        format!("{} tbody tr:not(.empty_row)", self.table_selector())
    }

    pub fn cell_selector(&self, row: usize, column: &str) -> String {
        format!(
            "{} tbody tr:nth-child({}) td.column-{}",
            self.table_selector(),
            row,
            column
        )
    }

    pub fn filter_selector(&self, column: &str) -> String {
        format!("{} #{}_{}", self.table_selector(), self.id, column)
    }

    pub fn search_button_selector(&self) -> String {
        format!("{} .grid-search-button", self.table_selector())
    }

    pub fn reset_button_selector(&self) -> String {
        format!("{} .grid-reset-button", self.table_selector())
    }

    /// Number of matching rows announced by the grid header
    pub async fn number_of_rows(&self) -> E2eResult<usize> {
        self.base.get_number_from_text(&self.title_selector()).await
    }

    /// Number of data rows rendered in the table body
    pub async fn visible_rows(&self) -> E2eResult<usize> {
        self.base.page().count(&self.rows_selector()).await
    }

    /// Set a filter control and submit the search
    pub async fn filter(&self, kind: FilterKind, column: &str, value: &str) -> E2eResult<()> {
        let selector = self.filter_selector(column);
        debug!("Filter {} grid: {} {} = '{}'", self.id, kind, column, value);
        match kind {
            FilterKind::Input => self.base.set_value(&selector, value).await?,
            FilterKind::Select => self.base.select_by_visible_text(&selector, value).await?,
        }
        self.base
            .click_and_wait_for_navigation(&self.search_button_selector())
            .await
    }

    /// Clear every active filter; a no-op when none is set
    pub async fn reset_filter(&self) -> E2eResult<()> {
        let reset = self.reset_button_selector();
        if self.base.element_visible(&reset).await? {
            self.base.click_and_wait_for_navigation(&reset).await?;
        }
        Ok(())
    }

    pub async fn reset_and_get_number_of_lines(&self) -> E2eResult<usize> {
        self.reset_filter().await?;
        self.number_of_rows().await
    }

    /// Text of one cell; rows are 1-based
    pub async fn text_column(&self, row: usize, column: &str) -> E2eResult<String> {
        let visible = self.visible_rows().await?;
        if row == 0 || row > visible {
            return Err(E2eError::NotFound(format!(
                "row {} in {} grid ({} visible)",
                row, self.id, visible
            )));
        }
        self.base.get_text(&self.cell_selector(row, column)).await
    }

    /// Read the listed columns of every visible row
    pub async fn snapshot(&self, columns: &[&str]) -> E2eResult<GridSnapshot> {
        let visible = self.visible_rows().await?;
        let mut rows = Vec::with_capacity(visible);
        for row in 1..=visible {
            let mut cells = BTreeMap::new();
            for column in columns {
                let text = self.base.get_text(&self.cell_selector(row, column)).await?;
                cells.insert(column.to_string(), text);
            }
            rows.push(cells);
        }
        Ok(GridSnapshot { rows })
    }
}

#[async_trait]
impl FilterableGrid for Grid {
    async fn filter(&self, kind: FilterKind, column: &str, value: &str) -> E2eResult<()> {
        Grid::filter(self, kind, column, value).await
    }

    async fn row_count(&self) -> E2eResult<usize> {
        self.number_of_rows().await
    }

    async fn read_cell(&self, row: usize, column: &str) -> E2eResult<String> {
        self.text_column(row, column).await
    }

    async fn reset_and_count_rows(&self) -> E2eResult<usize> {
        self.reset_and_get_number_of_lines().await
    }
}

/// Visible rows of a grid at one instant, column id to displayed text.
/// Any filter or reset makes it stale; capture a new one instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridSnapshot {
    rows: Vec<BTreeMap<String, String>>,
}

impl GridSnapshot {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[BTreeMap<String, String>] {
        &self.rows
    }

    /// Cell text, 1-based row
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        self.rows
            .get(row.checked_sub(1)?)?
            .get(column)
            .map(String::as_str)
    }

    /// 1-based indexes of rows whose `column` lacks `needle`
    pub fn rows_not_containing(&self, column: &str, needle: &str) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, cells)| !cells.get(column).is_some_and(|text| text.contains(needle)))
            .map(|(i, _)| i + 1)
            .collect()
    }
}
