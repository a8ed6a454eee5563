//! Main test runner: one isolated browsing context per suite, suites in
//! sequence, results collected into a JSON report

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::app;
use crate::config::HarnessConfig;
use crate::context::ContextLogEntry;
use crate::driver::{Browser, ContextOptions};
use crate::error::{E2eError, E2eResult};
use crate::session::SessionManager;
use crate::suite::{SuiteContext, SuiteState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Passed,
    Failed,
    Skipped,
}

/// Result of running a single test case
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseResult {
    pub title: String,
    pub identifier: String,
    pub status: CaseStatus,
    pub duration_ms: u64,
    pub error: Option<String>,
    pub context: Vec<ContextLogEntry>,
}

/// Result of running one suite
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub name: String,
    pub base_context: String,
    pub duration_ms: u64,
    /// Why the suite stopped early, if it did
    pub aborted: Option<String>,
    pub cases: Vec<CaseResult>,
    pub context: Vec<ContextLogEntry>,
}

impl SuiteResult {
    /// A suite that never got a browsing context
    pub fn not_started(name: &str, base_context: &str, reason: &E2eError) -> Self {
        Self {
            name: name.to_string(),
            base_context: base_context.to_string(),
            duration_ms: 0,
            aborted: Some(reason.to_string()),
            cases: Vec::new(),
            context: Vec::new(),
        }
    }

    fn count(&self, status: CaseStatus) -> usize {
        self.cases.iter().filter(|c| c.status == status).count()
    }

    pub fn passed(&self) -> usize {
        self.count(CaseStatus::Passed)
    }

    pub fn failed(&self) -> usize {
        self.count(CaseStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(CaseStatus::Skipped)
    }

    pub fn success(&self) -> bool {
        self.aborted.is_none() && self.failed() == 0
    }
}

/// Result of running all suites
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub suites: Vec<SuiteResult>,
}

impl TestSuiteResult {
    pub fn from_suites(suites: Vec<SuiteResult>, duration_ms: u64) -> Self {
        let passed = suites.iter().map(SuiteResult::passed).sum();
        let failed = suites.iter().map(SuiteResult::failed).sum();
        let skipped = suites.iter().map(SuiteResult::skipped).sum();
        Self {
            total: passed + failed + skipped,
            passed,
            failed,
            skipped,
            duration_ms,
            suites,
        }
    }

    pub fn success(&self) -> bool {
        self.suites.iter().all(SuiteResult::success)
    }
}

/// A described group of ordered test cases sharing one tab
#[async_trait]
pub trait Suite: Send + Sync {
    fn name(&self) -> &str;

    /// Prefix for the context entries of every case in the suite
    fn base_context(&self) -> &str;

    /// Run every case in order. Returns an error only when the suite
    /// cannot continue; case failures are recorded in `ctx`.
    async fn run(&self, ctx: &mut SuiteContext) -> E2eResult<()>;
}

pub struct TestRunner {
    config: Arc<HarnessConfig>,
    sessions: SessionManager,
}

impl TestRunner {
    pub fn new(config: HarnessConfig) -> Self {
        let options = ContextOptions {
            viewport_width: config.browser.viewport_width,
            viewport_height: config.browser.viewport_height,
            accept_downloads: true,
        };
        Self {
            config: Arc::new(config),
            sessions: SessionManager::new(options),
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Wait for the back office to answer before opening any browser
    pub async fn check_application(&self) -> E2eResult<()> {
        app::wait_until_reachable(&self.config.base_url, self.config.timeouts.health_check()).await
    }

    /// Run one suite inside its own browsing context
    pub async fn run_suite(&self, browser: &dyn Browser, suite: &dyn Suite) -> SuiteResult {
        info!("Suite: {}", suite.name());
        let config = self.config.clone();

        let outcome = self
            .sessions
            .scoped(browser, |session| async move {
                let mut ctx = SuiteContext::new(suite.name(), suite.base_context(), &session, config);
                if let Err(e) = suite.run(&mut ctx).await {
                    error!("Suite '{}' aborted: {}", suite.name(), e);
                    ctx.abort(&e);
                }
                ctx.advance(SuiteState::TornDown)?;
                Ok(ctx.finish())
            })
            .await;

        match outcome {
            Ok(result) => result,
            Err(e) => {
                error!("Suite '{}' could not run: {}", suite.name(), e);
                SuiteResult::not_started(suite.name(), suite.base_context(), &e)
            }
        }
    }

    /// Run suites strictly one after another
    pub async fn run_suites(&self, browser: &dyn Browser, suites: &[Box<dyn Suite>]) -> TestSuiteResult {
        let start = Instant::now();
        let mut results = Vec::with_capacity(suites.len());

        info!("Running {} suite(s)...", suites.len());

        for suite in suites {
            results.push(self.run_suite(browser, suite.as_ref()).await);
        }

        let report = TestSuiteResult::from_suites(results, start.elapsed().as_millis() as u64);

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            report.passed, report.failed, report.skipped, report.duration_ms
        );

        report
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}
