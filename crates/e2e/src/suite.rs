//! Per-suite state
//!
//! A suite walks a fixed lifecycle:
//!
//! ```text
//! INIT -> LOGGED_IN -> NAVIGATED -> [FILTERING <-> FILTERED]* -> RESET -> TORN_DOWN
//! ```
//!
//! Everything a suite step needs (tab, config, context log, state,
//! results so far) lives in one [`SuiteContext`] owned by the suite run.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::HarnessConfig;
use crate::context::{CaseKey, ContextTracker};
use crate::driver::Page;
use crate::error::{E2eError, E2eResult};
use crate::runner::{CaseResult, CaseStatus, SuiteResult};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SuiteState {
    Init,
    LoggedIn,
    Navigated,
    Filtering,
    Filtered,
    Reset,
    TornDown,
}

impl SuiteState {
    pub fn can_transition_to(self, next: SuiteState) -> bool {
        use SuiteState::*;

        if next == TornDown {
            return self != TornDown;
        }
        matches!(
            (self, next),
            (Init, LoggedIn)
                | (LoggedIn, Navigated)
                | (Navigated, Filtering)
                | (Navigated, Reset)
                | (Filtering, Filtered)
                | (Filtering, Reset)
                | (Filtered, Filtering)
                | (Filtered, Reset)
                | (Reset, Filtering)
                | (Reset, Reset)
        )
    }

    pub fn is_logged_in(self) -> bool {
        !matches!(self, SuiteState::Init | SuiteState::TornDown)
    }
}

impl fmt::Display for SuiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SuiteState::Init => "INIT",
            SuiteState::LoggedIn => "LOGGED_IN",
            SuiteState::Navigated => "NAVIGATED",
            SuiteState::Filtering => "FILTERING",
            SuiteState::Filtered => "FILTERED",
            SuiteState::Reset => "RESET",
            SuiteState::TornDown => "TORN_DOWN",
        };
        f.write_str(name)
    }
}

/// A case that has started but not been recorded yet
#[derive(Debug)]
pub struct CaseHandle {
    key: CaseKey,
    title: String,
    identifier: String,
    started: Instant,
}

pub struct SuiteContext {
    name: String,
    page: Arc<dyn Page>,
    config: Arc<HarnessConfig>,
    tracker: ContextTracker,
    state: SuiteState,
    cases: Vec<CaseResult>,
    aborted: Option<String>,
    started: Instant,
}

impl SuiteContext {
    pub fn new(name: &str, base_context: &str, session: &Session, config: Arc<HarnessConfig>) -> Self {
        Self::with_page(name, base_context, session.page(), config)
    }

    pub fn with_page(name: &str, base_context: &str, page: Arc<dyn Page>, config: Arc<HarnessConfig>) -> Self {
        Self {
            name: name.to_string(),
            page,
            config,
            tracker: ContextTracker::new(base_context),
            state: SuiteState::Init,
            cases: Vec::new(),
            aborted: None,
            started: Instant::now(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn page(&self) -> Arc<dyn Page> {
        self.page.clone()
    }

    pub fn config(&self) -> Arc<HarnessConfig> {
        self.config.clone()
    }

    pub fn state(&self) -> SuiteState {
        self.state
    }

    pub fn tracker(&self) -> &ContextTracker {
        &self.tracker
    }

    pub fn cases(&self) -> &[CaseResult] {
        &self.cases
    }

    /// Move to `next`. Anything but logging in while not logged in is a
    /// precondition violation; other illegal moves are invalid transitions.
    pub fn advance(&mut self, next: SuiteState) -> E2eResult<()> {
        if !self.state.can_transition_to(next) {
            if !self.state.is_logged_in() && next != SuiteState::LoggedIn {
                return Err(E2eError::Precondition {
                    operation: format!("enter {}", next),
                    state: self.state.to_string(),
                });
            }
            return Err(E2eError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    pub fn require_logged_in(&self, operation: &str) -> E2eResult<()> {
        if self.state.is_logged_in() {
            Ok(())
        } else {
            Err(E2eError::Precondition {
                operation: operation.to_string(),
                state: self.state.to_string(),
            })
        }
    }

    /// Fail unless the suite is logged in and has reached a screen
    pub fn require_navigated(&self, operation: &str) -> E2eResult<()> {
        match self.state {
            SuiteState::Init | SuiteState::LoggedIn | SuiteState::TornDown => Err(E2eError::Precondition {
                operation: operation.to_string(),
                state: self.state.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Start a case and tag it with its identifier
    pub fn begin_case(&mut self, title: &str, identifier: &str) -> CaseHandle {
        let key = self.tracker.open_case(title, identifier);
        CaseHandle {
            key,
            title: title.to_string(),
            identifier: identifier.to_string(),
            started: Instant::now(),
        }
    }

    /// Attach a named value to a running case
    pub fn add_context_item(&mut self, handle: &CaseHandle, key: &str, value: &str) {
        self.tracker.add_context_item(handle.key, key, value);
    }

    /// Record a finished case. Returns the error back only when it is
    /// fatal for the suite, so callers can `?` it.
    pub fn finish_case(&mut self, handle: CaseHandle, outcome: E2eResult<()>) -> E2eResult<()> {
        let duration_ms = handle.started.elapsed().as_millis() as u64;
        let context = self.tracker.entries_for(handle.key).cloned().collect();

        let (status, error, fatal) = match outcome {
            Ok(()) => {
                info!("✓ {} ({} ms)", handle.title, duration_ms);
                (CaseStatus::Passed, None, None)
            }
            Err(e) => {
                error!("✗ {} - {}", handle.title, e);
                let message = e.to_string();
                let fatal = e.is_fatal().then_some(e);
                (CaseStatus::Failed, Some(message), fatal)
            }
        };

        self.cases.push(CaseResult {
            title: handle.title,
            identifier: handle.identifier,
            status,
            duration_ms,
            error,
            context,
        });

        match fatal {
            Some(e) => {
                self.aborted = Some(e.to_string());
                Err(e)
            }
            None => Ok(()),
        }
    }

    /// Record a case as not run
    pub fn skip_case(&mut self, title: &str, identifier: &str) {
        warn!("- {} (skipped)", title);
        self.cases.push(CaseResult {
            title: title.to_string(),
            identifier: identifier.to_string(),
            status: CaseStatus::Skipped,
            duration_ms: 0,
            error: None,
            context: Vec::new(),
        });
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    /// Mark the suite aborted by an error raised outside any case
    pub fn abort(&mut self, reason: &E2eError) {
        if self.aborted.is_none() {
            self.aborted = Some(reason.to_string());
        }
    }

    /// Produce the suite report
    pub fn finish(self) -> SuiteResult {
        SuiteResult {
            name: self.name,
            base_context: self.tracker.base_context().to_string(),
            duration_ms: self.started.elapsed().as_millis() as u64,
            aborted: self.aborted,
            cases: self.cases,
            context: self.tracker.entries().to_vec(),
        }
    }
}
