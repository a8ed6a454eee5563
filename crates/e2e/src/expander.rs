//! Data-driven filter cases
//!
//! N filter cases expand into 2N test cases, run strictly in order
//! against one grid:
//!
//! ```text
//! for each case:
//!   filter-and-verify   apply filter, rows <= baseline, every row matches
//!   reset-and-verify    reset filters, rows == baseline
//! ```
//!
//! A filter matching no row is valid: the per-row loop simply does not run.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use backoffice_fixtures::{FilterCase, FilterKind};

use crate::error::{E2eError, E2eResult};
use crate::suite::{CaseHandle, SuiteContext, SuiteState};

/// A grid that can be filtered, read and reset
#[async_trait]
pub trait FilterableGrid: Send + Sync {
    /// Set the filter control of `column` and submit. The grid reflects
    /// the filter on the next read.
    async fn filter(&self, kind: FilterKind, column: &str, value: &str) -> E2eResult<()>;

    async fn row_count(&self) -> E2eResult<usize>;

    /// Cell text, 1-based row; `NotFound` past the last visible row
    async fn read_cell(&self, row: usize, column: &str) -> E2eResult<String>;

    /// Clear all filters and count rows. Idempotent.
    async fn reset_and_count_rows(&self) -> E2eResult<usize>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStep {
    FilterAndVerify,
    ResetAndVerify,
}

/// One generated test case
#[derive(Debug, Clone, Copy)]
pub struct ExpandedCase<'a> {
    pub case: &'a FilterCase,
    pub step: CaseStep,
}

impl ExpandedCase<'_> {
    pub fn title(&self) -> String {
        match self.step {
            CaseStep::FilterAndVerify => {
                format!("should filter by {} '{}'", self.case.column, self.case.value)
            }
            CaseStep::ResetAndVerify => {
                format!("should reset all filters after filtering by {}", self.case.column)
            }
        }
    }

    pub fn identifier(&self) -> String {
        match self.step {
            CaseStep::FilterAndVerify => self.case.identifier.clone(),
            CaseStep::ResetAndVerify => format!("{}Reset", self.case.identifier),
        }
    }
}

/// Enumerate the (filter, reset) pairs in declaration order
pub fn expand(cases: &[FilterCase]) -> Vec<ExpandedCase<'_>> {
    cases
        .iter()
        .flat_map(|case| {
            [
                ExpandedCase {
                    case,
                    step: CaseStep::FilterAndVerify,
                },
                ExpandedCase {
                    case,
                    step: CaseStep::ResetAndVerify,
                },
            ]
        })
        .collect()
}

/// Reset the grid and record the unfiltered row count, which must be positive
pub async fn capture_baseline<G: FilterableGrid + ?Sized>(grid: &G) -> E2eResult<usize> {
    let baseline = grid.reset_and_count_rows().await?;
    if baseline == 0 {
        return Err(E2eError::AssertionFailed(
            "grid is empty before any filter is applied".to_string(),
        ));
    }
    debug!("Baseline: {} rows", baseline);
    Ok(baseline)
}

/// Check an already filtered grid against `case`; returns the row count
pub async fn verify_filtered<G: FilterableGrid + ?Sized>(
    grid: &G,
    case: &FilterCase,
    baseline: usize,
) -> E2eResult<usize> {
    let observed = grid.row_count().await?;
    if observed > baseline {
        return Err(E2eError::RowCountExceeded {
            case: case.identifier.clone(),
            column: case.column.clone(),
            value: case.value.clone(),
            observed,
            baseline,
        });
    }

    let target = case.target_column();
    for row in 1..=observed {
        let text = grid.read_cell(row, target).await?;
        if !text.contains(&case.value) {
            return Err(E2eError::CellMismatch {
                case: case.identifier.clone(),
                column: case.column.clone(),
                value: case.value.clone(),
                target_column: target.to_string(),
                row,
                observed: text,
            });
        }
    }

    debug!("{}: {} of {} rows match", case.identifier, observed, baseline);
    Ok(observed)
}

pub async fn filter_and_verify<G: FilterableGrid + ?Sized>(
    grid: &G,
    case: &FilterCase,
    baseline: usize,
) -> E2eResult<usize> {
    grid.filter(case.kind, &case.column, &case.value).await?;
    verify_filtered(grid, case, baseline).await
}

pub async fn reset_and_verify<G: FilterableGrid + ?Sized>(grid: &G, baseline: usize) -> E2eResult<usize> {
    let observed = grid.reset_and_count_rows().await?;
    if observed != baseline {
        return Err(E2eError::RowCountMismatch {
            context: "resetting filters".to_string(),
            expected: baseline,
            observed,
        });
    }
    Ok(observed)
}

/// Run every expanded case in order, recording each one in `ctx`.
/// Returns early only on a suite-fatal error.
pub async fn run_filter_cases<G: FilterableGrid + ?Sized>(
    grid: &G,
    ctx: &mut SuiteContext,
    cases: &[FilterCase],
    baseline: usize,
) -> E2eResult<()> {
    for expanded in expand(cases) {
        let handle = ctx.begin_case(&expanded.title(), &expanded.identifier());
        let outcome = execute(grid, ctx, &handle, &expanded, baseline).await;
        ctx.finish_case(handle, outcome)?;
    }
    Ok(())
}

async fn execute<G: FilterableGrid + ?Sized>(
    grid: &G,
    ctx: &mut SuiteContext,
    handle: &CaseHandle,
    expanded: &ExpandedCase<'_>,
    baseline: usize,
) -> E2eResult<()> {
    let case = expanded.case;
    match expanded.step {
        CaseStep::FilterAndVerify => {
            ctx.advance(SuiteState::Filtering)?;
            ctx.add_context_item(handle, "filterBy", &case.column);
            grid.filter(case.kind, &case.column, &case.value).await?;
            ctx.advance(SuiteState::Filtered)?;
            verify_filtered(grid, case, baseline).await.map(|_| ())
        }
        CaseStep::ResetAndVerify => {
            ctx.advance(SuiteState::Reset)?;
            reset_and_verify(grid, baseline).await.map(|_| ())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Grid over a fixed table; filters are substring matches
    struct TableGrid {
        rows: Vec<Vec<(&'static str, &'static str)>>,
        active: Mutex<Option<(String, String)>>,
        reads: Mutex<usize>,
    }

    impl TableGrid {
        fn new(rows: Vec<Vec<(&'static str, &'static str)>>) -> Self {
            Self {
                rows,
                active: Mutex::new(None),
                reads: Mutex::new(0),
            }
        }

        fn visible(&self) -> Vec<&Vec<(&'static str, &'static str)>> {
            let active = self.active.lock().unwrap().clone();
            self.rows
                .iter()
                .filter(|row| match &active {
                    Some((column, value)) => row
                        .iter()
                        .any(|(c, v)| c == column && v.contains(value.as_str())),
                    None => true,
                })
                .collect()
        }
    }

    #[async_trait]
    impl FilterableGrid for TableGrid {
        async fn filter(&self, _kind: FilterKind, column: &str, value: &str) -> E2eResult<()> {
            *self.active.lock().unwrap() = Some((column.to_string(), value.to_string()));
            Ok(())
        }

        async fn row_count(&self) -> E2eResult<usize> {
            Ok(self.visible().len())
        }

        async fn read_cell(&self, row: usize, column: &str) -> E2eResult<String> {
            *self.reads.lock().unwrap() += 1;
            let visible = self.visible();
            let cells = visible
                .get(row.wrapping_sub(1))
                .ok_or_else(|| E2eError::NotFound(format!("row {}", row)))?;
            Ok(cells
                .iter()
                .find(|(c, _)| *c == column)
                .map(|(_, v)| v.to_string())
                .unwrap_or_default())
        }

        async fn reset_and_count_rows(&self) -> E2eResult<usize> {
            *self.active.lock().unwrap() = None;
            Ok(self.rows.len())
        }
    }

    fn cities() -> TableGrid {
        TableGrid::new(vec![
            vec![("id", "1"), ("city", "Paris")],
            vec![("id", "2"), ("city", "Miami")],
            vec![("id", "3"), ("city", "Paris")],
        ])
    }

    #[test]
    fn expands_into_ordered_pairs() {
        let cases = vec![
            FilterCase::input("filterId", "id", "1"),
            FilterCase::input("filterCity", "city", "Paris"),
        ];
        let expanded = expand(&cases);
        let ids: Vec<_> = expanded.iter().map(|e| e.identifier()).collect();
        assert_eq!(ids, ["filterId", "filterIdReset", "filterCity", "filterCityReset"]);
        assert_eq!(expanded[2].title(), "should filter by city 'Paris'");
        assert_eq!(expanded[3].step, CaseStep::ResetAndVerify);
        assert!(expand(&[]).is_empty());
    }

    #[tokio::test]
    async fn filter_then_reset_returns_to_baseline() {
        let grid = cities();
        let baseline = capture_baseline(&grid).await.unwrap();
        let case = FilterCase::input("filterCity", "city", "Paris");

        assert_eq!(filter_and_verify(&grid, &case, baseline).await.unwrap(), 2);
        assert_eq!(reset_and_verify(&grid, baseline).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn empty_result_skips_row_checks() {
        let grid = cities();
        let case = FilterCase::input("filterCity", "city", "Tokyo");

        assert_eq!(filter_and_verify(&grid, &case, 3).await.unwrap(), 0);
        assert_eq!(*grid.reads.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn reports_first_row_not_matching() {
        let grid = cities();
        let case = FilterCase::input("filterCity", "city", "Paris");
        grid.filter(FilterKind::Input, "id", "2").await.unwrap();

        let err = verify_filtered(&grid, &case, 3).await.unwrap_err();
        match err {
            E2eError::CellMismatch { row, observed, target_column, .. } => {
                assert_eq!(row, 1);
                assert_eq!(observed, "Miami");
                assert_eq!(target_column, "city");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn match_is_case_sensitive() {
        let grid = cities();
        let case = FilterCase::input("filterCity", "city", "paris");
        grid.filter(FilterKind::Input, "city", "Paris").await.unwrap();

        assert!(matches!(
            verify_filtered(&grid, &case, 3).await,
            Err(E2eError::CellMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn rows_above_baseline_fail() {
        let grid = cities();
        let case = FilterCase::input("filterCity", "city", "a");

        let err = filter_and_verify(&grid, &case, 2).await.unwrap_err();
        assert!(matches!(
            err,
            E2eError::RowCountExceeded { observed: 3, baseline: 2, .. }
        ));
    }

    #[tokio::test]
    async fn reset_must_equal_baseline_exactly() {
        let grid = cities();
        let err = reset_and_verify(&grid, 4).await.unwrap_err();
        assert!(matches!(
            err,
            E2eError::RowCountMismatch { expected: 4, observed: 3, .. }
        ));
    }

    #[tokio::test]
    async fn reset_is_idempotent() {
        let grid = cities();
        grid.filter(FilterKind::Input, "city", "Miami").await.unwrap();
        let first = grid.reset_and_count_rows().await.unwrap();
        let second = grid.reset_and_count_rows().await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_grid_has_no_baseline() {
        let grid = TableGrid::new(vec![]);
        assert!(matches!(
            capture_baseline(&grid).await,
            Err(E2eError::AssertionFailed(_))
        ));
    }

    #[tokio::test]
    async fn select_filter_is_checked_on_target_column() {
        let grid = TableGrid::new(vec![
            vec![("id_country", "8"), ("country_name", "France")],
            vec![("id_country", "21"), ("country_name", "United States")],
        ]);
        let case = FilterCase::select("filterIdCountry", "country_name", "France").verified_on("country_name");

        assert_eq!(filter_and_verify(&grid, &case, 2).await.unwrap(), 1);
    }
}
