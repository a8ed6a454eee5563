//! Back Office E2E Test Framework
//!
//! This crate drives a real browser against a running shop back office and
//! runs data-driven functional suites:
//! - Checks the back office answers before opening any browser
//! - Controls Playwright through a long-lived Node bridge (JSON lines)
//! - Gives every suite its own browsing context, closed whatever happens
//! - Expands filter cases into ordered filter/reset test cases
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── check_application() -> reachable?                    │
//! │    ├── run_suite(browser, suite) -> SuiteResult             │
//! │    │     └── SessionManager::scoped(context + tab)          │
//! │    └── write_results() -> test-results.json                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Suite                                                      │
//! │    ├── login_bo            INIT -> LOGGED_IN                │
//! │    ├── go_to_page          LOGGED_IN -> NAVIGATED           │
//! │    └── cases               FILTERING <-> FILTERED, RESET    │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Pages: Login, Dashboard, Addresses (Grid), Import          │
//! │  Driver: Browser / BrowserContext / Page (Playwright)       │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod expander;
pub mod files;
pub mod pages;
pub mod playwright;
pub mod runner;
pub mod session;
pub mod suite;
pub mod suites;

pub use config::HarnessConfig;
pub use context::{ContextLogEntry, ContextTracker};
pub use driver::{Browser, BrowserContext, Page};
pub use error::{E2eError, E2eResult, Severity};
pub use playwright::{BrowserKind, PlaywrightBrowser, PlaywrightConfig};
pub use runner::{CaseResult, CaseStatus, Suite, SuiteResult, TestRunner, TestSuiteResult};
pub use session::{Session, SessionManager};
pub use suite::{SuiteContext, SuiteState};
pub use suites::{DownloadSampleFiles, FilterAddresses, SuiteSelection};
