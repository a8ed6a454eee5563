//! Error types for E2E testing

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error("Application not reachable at {url} after {attempts} attempts")]
    ApplicationUnreachable { url: String, attempts: usize },

    #[error("Playwright not found. Install with: npx playwright install")]
    PlaywrightNotFound,

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Playwright bridge closed: {0}")]
    BridgeClosed(String),

    #[error("Failed to create browsing session: {0}")]
    SessionCreate(String),

    #[error("Precondition violated: cannot {operation} while {state}")]
    Precondition { operation: String, state: String },

    #[error("Invalid suite transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Timeout waiting for: {0}")]
    Timeout(String),

    #[error("Filter '{case}' ({column} = '{value}'): {observed} rows exceed the baseline of {baseline}")]
    RowCountExceeded {
        case: String,
        column: String,
        value: String,
        observed: usize,
        baseline: usize,
    },

    #[error("Row count mismatch after {context}: expected {expected}, observed {observed}")]
    RowCountMismatch {
        context: String,
        expected: usize,
        observed: usize,
    },

    #[error("Filter '{case}' ({column} = '{value}'): row {row} shows '{observed}' in {target_column}")]
    CellMismatch {
        case: String,
        column: String,
        value: String,
        target_column: String,
        row: usize,
        observed: String,
    },

    #[error("File was not downloaded: {0}")]
    FileMissing(PathBuf),

    #[error("Text '{text}' not found in {path}")]
    TextNotFound { path: PathBuf, text: String },

    #[error("Assertion failed: {0}")]
    AssertionFailed(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Fixture error: {0}")]
    Fixture(#[from] backoffice_fixtures::FixtureError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type E2eResult<T> = Result<T, E2eError>;

/// How far a failure reaches when it happens inside a test case
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Recorded against the case; the next case still runs
    CaseFailure,
    /// Recorded against the case; the rest of the suite is skipped
    SuiteFatal,
}

impl E2eError {
    pub fn severity(&self) -> Severity {
        match self {
            E2eError::ApplicationUnreachable { .. }
            | E2eError::PlaywrightNotFound
            | E2eError::BridgeClosed(_)
            | E2eError::SessionCreate(_)
            | E2eError::Precondition { .. }
            | E2eError::InvalidTransition { .. }
            | E2eError::Config(_) => Severity::SuiteFatal,
            _ => Severity::CaseFailure,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::SuiteFatal
    }
}
