//! Playwright browser automation
//!
//! One long-lived `node` process runs a generated bridge script that
//! owns the real Playwright browser. Requests and responses are
//! newline-delimited JSON over the child's stdin/stdout:
//!
//! ```text
//! -> {"id":7,"op":"click","page":"page-2","selector":"#submit","timeout_ms":10000}
//! <- {"id":7,"ok":true,"result":null}
//! <- {"id":8,"ok":false,"error":"...","timeout":true}
//! ```

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::driver::{Browser, BrowserContext, ContextOptions, Page, WaitState};
use crate::error::{E2eError, E2eResult};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = E2eError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chromium" | "chrome" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" => Ok(BrowserKind::Webkit),
            other => Err(E2eError::Config(format!("unknown browser '{}'", other))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone)]
pub struct PlaywrightConfig {
    pub browser: BrowserKind,
    pub headless: bool,
    pub slow_mo_ms: u64,

    /// Default timeout for clicks, fills and reads
    pub action_timeout: Duration,

    /// Default timeout for navigations
    pub navigation_timeout: Duration,

    /// Hard deadline for a single bridge round trip
    pub request_timeout: Duration,

    /// `node_modules` directory containing the `playwright` package
    pub node_modules: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chromium,
            headless: true,
            slow_mo_ms: 0,
            action_timeout: Duration::from_secs(10),
            navigation_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(60),
            node_modules: None,
        }
    }
}

/// A request understood by the bridge script
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    Launch { browser: &'a str, headless: bool, slow_mo_ms: u64 },
    NewContext { viewport_width: u32, viewport_height: u32, accept_downloads: bool },
    NewPage { context: &'a str },
    CloseContext { context: &'a str },
    Goto { page: &'a str, url: &'a str, timeout_ms: u64 },
    Url { page: &'a str },
    Title { page: &'a str },
    Click { page: &'a str, selector: &'a str, timeout_ms: u64 },
    Hover { page: &'a str, selector: &'a str, timeout_ms: u64 },
    Fill { page: &'a str, selector: &'a str, value: &'a str, timeout_ms: u64 },
    SelectOption { page: &'a str, selector: &'a str, label: &'a str, timeout_ms: u64 },
    TextContent { page: &'a str, selector: &'a str, timeout_ms: u64 },
    Count { page: &'a str, selector: &'a str },
    IsVisible { page: &'a str, selector: &'a str },
    WaitForSelector { page: &'a str, selector: &'a str, state: &'a str, timeout_ms: u64 },
    ClickAndWaitForNavigation { page: &'a str, selector: &'a str, timeout_ms: u64 },
    Download { page: &'a str, selector: &'a str, dir: &'a str, timeout_ms: u64 },
    Close,
}

impl Request<'_> {
    fn op(&self) -> &'static str {
        match self {
            Request::Launch { .. } => "launch",
            Request::NewContext { .. } => "new_context",
            Request::NewPage { .. } => "new_page",
            Request::CloseContext { .. } => "close_context",
            Request::Goto { .. } => "goto",
            Request::Url { .. } => "url",
            Request::Title { .. } => "title",
            Request::Click { .. } => "click",
            Request::Hover { .. } => "hover",
            Request::Fill { .. } => "fill",
            Request::SelectOption { .. } => "select_option",
            Request::TextContent { .. } => "text_content",
            Request::Count { .. } => "count",
            Request::IsVisible { .. } => "is_visible",
            Request::WaitForSelector { .. } => "wait_for_selector",
            Request::ClickAndWaitForNavigation { .. } => "click_and_wait_for_navigation",
            Request::Download { .. } => "download",
            Request::Close => "close",
        }
    }
}

#[derive(Serialize)]
struct Envelope<'a> {
    id: u64,
    #[serde(flatten)]
    request: &'a Request<'a>,
}

#[derive(Debug, Deserialize)]
struct Response {
    id: u64,
    ok: bool,
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timeout: bool,
}

struct BridgeIo {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
}

/// The node process and the JSON channel to it
struct Bridge {
    io: Mutex<Option<BridgeIo>>,
    next_id: AtomicU64,
    request_timeout: Duration,
    _script_dir: tempfile::TempDir,
}

impl Bridge {
    async fn call(&self, request: Request<'_>) -> E2eResult<serde_json::Value> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut line = serde_json::to_string(&Envelope { id, request: &request })?;
        line.push('\n');

        debug!("bridge -> #{} {}", id, request.op());

        // Held for the whole round trip: one request in flight at a time
        let mut guard = self.io.lock().await;
        let io = guard
            .as_mut()
            .ok_or_else(|| E2eError::BridgeClosed("browser already closed".to_string()))?;

        io.stdin.write_all(line.as_bytes()).await?;
        io.stdin.flush().await?;

        let response = match tokio::time::timeout(self.request_timeout, read_response(&mut io.stdout)).await {
            Ok(response) => response?,
            Err(_) => {
                // A late response would desynchronise every later request
                if let Some(mut io) = guard.take() {
                    let _ = io.child.start_kill();
                }
                return Err(E2eError::BridgeClosed(format!(
                    "no response to '{}' within {:?}",
                    request.op(),
                    self.request_timeout
                )));
            }
        };

        if response.id != id {
            return Err(E2eError::Playwright(format!(
                "response #{} does not match request #{}",
                response.id, id
            )));
        }

        if response.ok {
            Ok(response.result)
        } else {
            let message = response.error.unwrap_or_else(|| "unknown error".to_string());
            if response.timeout {
                Err(E2eError::Timeout(format!("{}: {}", request.op(), message)))
            } else {
                Err(E2eError::Playwright(format!("{}: {}", request.op(), message)))
            }
        }
    }

    async fn shutdown(&self, grace: Duration) -> E2eResult<()> {
        let Some(mut io) = self.io.lock().await.take() else {
            return Ok(());
        };
        drop(io.stdin);

        match tokio::time::timeout(grace, io.child.wait()).await {
            Ok(status) => {
                let status = status?;
                debug!("Playwright bridge exited with {}", status);
            }
            Err(_) => {
                warn!("Playwright bridge did not exit within {:?}, killing it", grace);
                io.child.kill().await?;
            }
        }
        Ok(())
    }
}

async fn read_response(stdout: &mut Lines<BufReader<ChildStdout>>) -> E2eResult<Response> {
    loop {
        let line = stdout
            .next_line()
            .await?
            .ok_or_else(|| E2eError::BridgeClosed("bridge stdout closed".to_string()))?;

        if line.trim_start().starts_with('{') {
            return Ok(serde_json::from_str(&line)?);
        }
        debug!("[playwright] {}", line);
    }
}

fn string_result(value: serde_json::Value, op: &str) -> E2eResult<String> {
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(E2eError::Playwright(format!("{} returned {}, expected a string", op, other))),
    }
}

fn timeout_ms(duration: Duration) -> u64 {
    duration.as_millis() as u64
}

/// A Playwright-driven browser
pub struct PlaywrightBrowser {
    bridge: Arc<Bridge>,
    config: PlaywrightConfig,
}

impl PlaywrightBrowser {
    /// Start the bridge process and launch the configured browser
    pub async fn launch(config: PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, BRIDGE_SCRIPT)?;

        let node_modules = match &config.node_modules {
            Some(dir) => dir.clone(),
            None => std::env::current_dir()?.join("node_modules"),
        };

        debug!("Starting Playwright bridge: {}", script_path.display());

        let mut child = TokioCommand::new("node")
            .arg(&script_path)
            .env("NODE_PATH", &node_modules)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Playwright(format!("failed to spawn node: {}", e)))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("[playwright] {}", line);
                }
            });
        }

        let bridge = Arc::new(Bridge {
            io: Mutex::new(Some(BridgeIo {
                child,
                stdin,
                stdout: BufReader::new(stdout).lines(),
            })),
            next_id: AtomicU64::new(1),
            request_timeout: config.request_timeout,
            _script_dir: script_dir,
        });

        bridge
            .call(Request::Launch {
                browser: config.browser.as_str(),
                headless: config.headless,
                slow_mo_ms: config.slow_mo_ms,
            })
            .await?;

        info!(
            "Launched {} (headless: {})",
            config.browser.as_str(),
            config.headless
        );

        Ok(Self { bridge, config })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }
}

#[async_trait]
impl Browser for PlaywrightBrowser {
    async fn new_context(&self, options: &ContextOptions) -> E2eResult<Arc<dyn BrowserContext>> {
        let id = self
            .bridge
            .call(Request::NewContext {
                viewport_width: options.viewport_width,
                viewport_height: options.viewport_height,
                accept_downloads: options.accept_downloads,
            })
            .await
            .and_then(|v| string_result(v, "new_context"))?;

        Ok(Arc::new(PlaywrightContext {
            id,
            bridge: self.bridge.clone(),
            config: self.config.clone(),
        }))
    }

    async fn close(&self) -> E2eResult<()> {
        let result = self.bridge.call(Request::Close).await;
        self.bridge.shutdown(Duration::from_secs(5)).await?;
        result.map(|_| ())
    }
}

struct PlaywrightContext {
    id: String,
    bridge: Arc<Bridge>,
    config: PlaywrightConfig,
}

#[async_trait]
impl BrowserContext for PlaywrightContext {
    fn id(&self) -> &str {
        &self.id
    }

    async fn new_page(&self) -> E2eResult<Arc<dyn Page>> {
        let id = self
            .bridge
            .call(Request::NewPage { context: &self.id })
            .await
            .and_then(|v| string_result(v, "new_page"))?;

        Ok(Arc::new(PlaywrightPage {
            id,
            bridge: self.bridge.clone(),
            action_timeout: self.config.action_timeout,
            navigation_timeout: self.config.navigation_timeout,
        }))
    }

    async fn close(&self) -> E2eResult<()> {
        self.bridge
            .call(Request::CloseContext { context: &self.id })
            .await
            .map(|_| ())
    }
}

struct PlaywrightPage {
    id: String,
    bridge: Arc<Bridge>,
    action_timeout: Duration,
    navigation_timeout: Duration,
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        self.bridge
            .call(Request::Goto {
                page: &self.id,
                url,
                timeout_ms: timeout_ms(self.navigation_timeout),
            })
            .await
            .map(|_| ())
    }

    async fn url(&self) -> E2eResult<String> {
        let value = self.bridge.call(Request::Url { page: &self.id }).await?;
        string_result(value, "url")
    }

    async fn title(&self) -> E2eResult<String> {
        let value = self.bridge.call(Request::Title { page: &self.id }).await?;
        string_result(value, "title")
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        self.bridge
            .call(Request::Click {
                page: &self.id,
                selector,
                timeout_ms: timeout_ms(self.action_timeout),
            })
            .await
            .map(|_| ())
    }

    async fn hover(&self, selector: &str) -> E2eResult<()> {
        self.bridge
            .call(Request::Hover {
                page: &self.id,
                selector,
                timeout_ms: timeout_ms(self.action_timeout),
            })
            .await
            .map(|_| ())
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        self.bridge
            .call(Request::Fill {
                page: &self.id,
                selector,
                value,
                timeout_ms: timeout_ms(self.action_timeout),
            })
            .await
            .map(|_| ())
    }

    async fn select_option(&self, selector: &str, label: &str) -> E2eResult<()> {
        self.bridge
            .call(Request::SelectOption {
                page: &self.id,
                selector,
                label,
                timeout_ms: timeout_ms(self.action_timeout),
            })
            .await
            .map(|_| ())
    }

    async fn text_content(&self, selector: &str) -> E2eResult<String> {
        let value = self
            .bridge
            .call(Request::TextContent {
                page: &self.id,
                selector,
                timeout_ms: timeout_ms(self.action_timeout),
            })
            .await?;
        string_result(value, "text_content")
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        let value = self
            .bridge
            .call(Request::Count { page: &self.id, selector })
            .await?;
        value
            .as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| E2eError::Playwright(format!("count returned {}", value)))
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        let value = self
            .bridge
            .call(Request::IsVisible { page: &self.id, selector })
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn wait_for_selector(&self, selector: &str, state: WaitState, timeout: Duration) -> E2eResult<()> {
        self.bridge
            .call(Request::WaitForSelector {
                page: &self.id,
                selector,
                state: state.as_str(),
                timeout_ms: timeout_ms(timeout),
            })
            .await
            .map(|_| ())
    }

    async fn click_and_wait_for_navigation(&self, selector: &str, timeout: Duration) -> E2eResult<()> {
        self.bridge
            .call(Request::ClickAndWaitForNavigation {
                page: &self.id,
                selector,
                timeout_ms: timeout_ms(timeout),
            })
            .await
            .map(|_| ())
    }

    async fn click_and_download(&self, selector: &str, dir: &Path, timeout: Duration) -> E2eResult<PathBuf> {
        let dir = dir.to_string_lossy();
        let value = self
            .bridge
            .call(Request::Download {
                page: &self.id,
                selector,
                dir: &dir,
                timeout_ms: timeout_ms(timeout),
            })
            .await?;
        string_result(value, "download").map(PathBuf::from)
    }
}

const BRIDGE_SCRIPT: &str = r##"
const readline = require('readline');
const path = require('path');
const playwright = require('playwright');

let browser = null;
const contexts = new Map();
const pages = new Map();
let nextHandle = 1;

const handle = (prefix) => `${prefix}-${nextHandle++}`;

function pageOf(id) {
  const entry = pages.get(id);
  if (!entry) throw new Error(`unknown page ${id}`);
  return entry.page;
}

const ops = {
  async launch(req) {
    browser = await playwright[req.browser].launch({ headless: req.headless, slowMo: req.slow_mo_ms });
    return null;
  },
  async new_context(req) {
    if (!browser) throw new Error('browser not launched');
    const context = await browser.newContext({
      viewport: { width: req.viewport_width, height: req.viewport_height },
      acceptDownloads: req.accept_downloads,
    });
    const id = handle('context');
    contexts.set(id, context);
    return id;
  },
  async new_page(req) {
    const context = contexts.get(req.context);
    if (!context) throw new Error(`unknown context ${req.context}`);
    const page = await context.newPage();
    const id = handle('page');
    pages.set(id, { page, context: req.context });
    return id;
  },
  async close_context(req) {
    const context = contexts.get(req.context);
    if (!context) return null;
    for (const [id, entry] of pages) {
      if (entry.context === req.context) pages.delete(id);
    }
    contexts.delete(req.context);
    await context.close();
    return null;
  },
  async goto(req) {
    await pageOf(req.page).goto(req.url, { timeout: req.timeout_ms, waitUntil: 'load' });
    return null;
  },
  async url(req) {
    return pageOf(req.page).url();
  },
  async title(req) {
    return pageOf(req.page).title();
  },
  async click(req) {
    await pageOf(req.page).click(req.selector, { timeout: req.timeout_ms });
    return null;
  },
  async hover(req) {
    await pageOf(req.page).hover(req.selector, { timeout: req.timeout_ms });
    return null;
  },
  async fill(req) {
    await pageOf(req.page).fill(req.selector, req.value, { timeout: req.timeout_ms });
    return null;
  },
  async select_option(req) {
    await pageOf(req.page).selectOption(req.selector, { label: req.label }, { timeout: req.timeout_ms });
    return null;
  },
  async text_content(req) {
    const text = await pageOf(req.page).textContent(req.selector, { timeout: req.timeout_ms });
    return text === null ? '' : text;
  },
  async count(req) {
    return pageOf(req.page).locator(req.selector).count();
  },
  async is_visible(req) {
    return pageOf(req.page).isVisible(req.selector);
  },
  async wait_for_selector(req) {
    await pageOf(req.page).waitForSelector(req.selector, { state: req.state, timeout: req.timeout_ms });
    return null;
  },
  async click_and_wait_for_navigation(req) {
    const page = pageOf(req.page);
    await Promise.all([
      page.waitForNavigation({ waitUntil: 'networkidle', timeout: req.timeout_ms }),
      page.click(req.selector, { timeout: req.timeout_ms }),
    ]);
    return null;
  },
  async download(req) {
    const page = pageOf(req.page);
    const [download] = await Promise.all([
      page.waitForEvent('download', { timeout: req.timeout_ms }),
      page.click(req.selector, { timeout: req.timeout_ms }),
    ]);
    const target = path.join(req.dir, download.suggestedFilename());
    await download.saveAs(target);
    return target;
  },
  async close() {
    if (browser) await browser.close();
    browser = null;
    return null;
  },
};

const write = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

const rl = readline.createInterface({ input: process.stdin });
rl.on('line', async (line) => {
  let req;
  try {
    req = JSON.parse(line);
  } catch (error) {
    process.stderr.write(`unparsable request: ${line}\n`);
    return;
  }
  const op = ops[req.op];
  if (!op) {
    write({ id: req.id, ok: false, error: `unknown op ${req.op}` });
    return;
  }
  try {
    const result = await op(req);
    write({ id: req.id, ok: true, result: result === undefined ? null : result });
  } catch (error) {
    write({ id: req.id, ok: false, error: error.message, timeout: error.name === 'TimeoutError' });
  }
});
rl.on('close', async () => {
  if (browser) await browser.close();
  process.exit(0);
});
"##;
