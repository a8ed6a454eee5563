//! In-memory back office implementing the driver traits
//!
//! Understands the selectors the page objects build: the login form, the
//! sidebar, the addresses grid and the import sample-file dropdown.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use backoffice_e2e::config::HarnessConfig;
use backoffice_e2e::driver::{Browser, BrowserContext, ContextOptions, Page, WaitState};
use backoffice_e2e::pages::import::SAMPLE_FILES_TOGGLE;
use backoffice_e2e::pages::{AddressesPage, DashboardPage, ImportPage, LoginPage, SF_TOOLBAR_HIDE_BUTTON};
use backoffice_e2e::{E2eError, E2eResult};
use backoffice_fixtures::SampleFileKind;

const GRID_TABLE: &str = "#address_grid_table";
const GRID_TITLE: &str = "#address_grid_panel h3.card-header-title";

/// Twelve addresses, the three demo ones among them
pub fn demo_addresses() -> Vec<BTreeMap<String, String>> {
    let rows = [
        ["1", "Anonymous", "Anonymous", "Anonymous", "00000", "Anonymous", "France"],
        ["2", "John", "DOE", "16, Main street", "33133", "Miami", "United States"],
        ["3", "John", "DOE", "16, Main street", "75002", "Paris", "France"],
        ["4", "Jane", "DOE", "16, Main street", "33133", "Miami", "United States"],
        ["5", "Jean", "Dupont", "767 Fifth Ave.", "10153", "New York", "United States"],
        ["6", "Marie", "Curie", "11 rue Pierre et Marie Curie", "75005", "Paris", "France"],
        ["7", "Hans", "Muller", "Unter den Linden 1", "10117", "Berlin", "Germany"],
        ["8", "Ana", "Lopez", "Calle Mayor 5", "28013", "Madrid", "Spain"],
        ["9", "Luca", "Rossi", "Via Roma 10", "00184", "Rome", "Italy"],
        ["10", "Emma", "Smith", "221B Baker Street", "NW16XE", "London", "United Kingdom"],
        ["11", "Noah", "Martin", "5 Place Bellecour", "69002", "Lyon", "France"],
        ["12", "Olivia", "Brown", "350 Fifth Avenue", "10118", "New York", "United States"],
    ];
    rows.iter()
        .map(|row| {
            AddressesPage::COLUMNS
                .iter()
                .zip(row.iter())
                .map(|(column, value)| (column.to_string(), value.to_string()))
                .collect()
        })
        .collect()
}

/// Switches that make the fake misbehave
#[derive(Debug, Default, Clone)]
pub struct Faults {
    pub fail_new_context: bool,
    pub fail_new_page: bool,
    /// Contexts that error on close, after counting the close
    pub fail_close: bool,
    /// Sample files whose download never completes
    pub stalled_downloads: HashSet<&'static str>,
    /// Sample files served with the wrong header
    pub corrupt_downloads: HashSet<&'static str>,
    /// Grid column whose filter is ignored by the server
    pub ignored_filter: Option<&'static str>,
}

struct Shared {
    email: String,
    password: String,
    addresses: Vec<BTreeMap<String, String>>,
    faults: Faults,
    contexts_opened: AtomicUsize,
    contexts_closed: AtomicUsize,
    downloads: AtomicUsize,
}

#[derive(Clone)]
pub struct FakeBackOffice {
    shared: Arc<Shared>,
}

impl FakeBackOffice {
    pub fn new(config: &HarnessConfig) -> Self {
        Self::with_faults(config, Faults::default())
    }

    pub fn with_faults(config: &HarnessConfig, faults: Faults) -> Self {
        Self::with_addresses(config, faults, demo_addresses())
    }

    pub fn with_addresses(config: &HarnessConfig, faults: Faults, addresses: Vec<BTreeMap<String, String>>) -> Self {
        Self {
            shared: Arc::new(Shared {
                email: config.email.clone(),
                password: config.password.clone(),
                addresses,
                faults,
                contexts_opened: AtomicUsize::new(0),
                contexts_closed: AtomicUsize::new(0),
                downloads: AtomicUsize::new(0),
            }),
        }
    }

    pub fn contexts_opened(&self) -> usize {
        self.shared.contexts_opened.load(Ordering::SeqCst)
    }

    pub fn contexts_closed(&self) -> usize {
        self.shared.contexts_closed.load(Ordering::SeqCst)
    }

    pub fn downloads(&self) -> usize {
        self.shared.downloads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Browser for FakeBackOffice {
    async fn new_context(&self, _options: &ContextOptions) -> E2eResult<Arc<dyn BrowserContext>> {
        if self.shared.faults.fail_new_context {
            return Err(E2eError::Playwright("browser has been closed".to_string()));
        }
        let n = self.shared.contexts_opened.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(Arc::new(FakeContext {
            id: format!("ctx-{}", n),
            shared: self.shared.clone(),
        }))
    }

    async fn close(&self) -> E2eResult<()> {
        Ok(())
    }
}

struct FakeContext {
    id: String,
    shared: Arc<Shared>,
}

#[async_trait]
impl BrowserContext for FakeContext {
    fn id(&self) -> &str {
        &self.id
    }

    async fn new_page(&self) -> E2eResult<Arc<dyn Page>> {
        if self.shared.faults.fail_new_page {
            return Err(E2eError::Playwright("target closed".to_string()));
        }
        Ok(Arc::new(FakePage {
            shared: self.shared.clone(),
            state: Mutex::new(PageState::default()),
        }))
    }

    async fn close(&self) -> E2eResult<()> {
        self.shared.contexts_closed.fetch_add(1, Ordering::SeqCst);
        if self.shared.faults.fail_close {
            return Err(E2eError::Playwright(
                "Target page, context or browser has been closed".to_string(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Screen {
    #[default]
    Blank,
    Login,
    Dashboard,
    Addresses,
    Import,
}

#[derive(Default)]
struct PageState {
    screen: Screen,
    logged_in: bool,
    email: String,
    password: String,
    expanded: Option<&'static str>,
    toolbar_hidden: bool,
    dropdown_open: bool,
    pending: BTreeMap<String, String>,
    applied: BTreeMap<String, String>,
}

struct FakePage {
    shared: Arc<Shared>,
    state: Mutex<PageState>,
}

impl FakePage {
    fn filtered(&self, state: &PageState) -> Vec<BTreeMap<String, String>> {
        self.shared
            .addresses
            .iter()
            .filter(|row| {
                state.applied.iter().all(|(column, value)| {
                    if self.shared.faults.ignored_filter == Some(column.as_str()) {
                        return true;
                    }
                    match column.as_str() {
                        "id_address" => row.get(column) == Some(value),
                        "id_country" => row.get("country_name") == Some(value),
                        _ => row
                            .get(column)
                            .map(|cell| cell.to_lowercase().contains(&value.to_lowercase()))
                            .unwrap_or(false),
                    }
                })
            })
            .cloned()
            .collect()
    }

    fn visible(&self, state: &PageState, selector: &str) -> bool {
        let logged_screen = matches!(state.screen, Screen::Dashboard | Screen::Addresses | Screen::Import);
        match state.screen {
            Screen::Login if matches!(selector, "#email" | "#passwd" | "#submit_login") => return true,
            _ => {}
        }
        if logged_screen {
            if selector == DashboardPage::CUSTOMERS_PARENT_LINK || selector == DashboardPage::ADVANCED_PARAMETERS_LINK {
                return true;
            }
            if selector == DashboardPage::ADDRESSES_LINK || selector == format!("{} a", DashboardPage::ADDRESSES_LINK) {
                return state.expanded == Some(DashboardPage::CUSTOMERS_PARENT_LINK);
            }
            if selector == DashboardPage::IMPORT_LINK || selector == format!("{} a", DashboardPage::IMPORT_LINK) {
                return state.expanded == Some(DashboardPage::ADVANCED_PARAMETERS_LINK);
            }
        }
        match state.screen {
            Screen::Addresses => {
                if selector == GRID_TITLE || selector == format!("{} .grid-search-button", GRID_TABLE) {
                    return true;
                }
                if selector == format!("{} .grid-reset-button", GRID_TABLE) {
                    return !state.applied.is_empty();
                }
                filter_column(selector).is_some()
            }
            Screen::Import => {
                if selector == SF_TOOLBAR_HIDE_BUTTON {
                    return !state.toolbar_hidden;
                }
                if selector == SAMPLE_FILES_TOGGLE {
                    return true;
                }
                sample_key(selector).is_some() && state.dropdown_open
            }
            _ => false,
        }
    }

    fn navigate_to(&self, state: &mut PageState, screen: Screen) {
        state.screen = if state.logged_in || screen == Screen::Login {
            screen
        } else {
            Screen::Login
        };
        state.expanded = None;
        state.dropdown_open = false;
    }
}

fn filter_column(selector: &str) -> Option<&str> {
    selector.strip_prefix("#address_grid_table #address_")
}

fn sample_key(selector: &str) -> Option<&str> {
    selector
        .strip_prefix("a[href*='sample/download/")?
        .strip_suffix("']")
}

fn parse_cell(selector: &str) -> Option<(usize, &str)> {
    let rest = selector.strip_prefix("#address_grid_table tbody tr:nth-child(")?;
    let (row, column) = rest.split_once(") td.column-")?;
    Some((row.parse().ok()?, column))
}

#[async_trait]
impl Page for FakePage {
    async fn goto(&self, url: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        let screen = if url.ends_with(LoginPage::ROUTE) {
            Screen::Login
        } else if url.ends_with(DashboardPage::ROUTE) {
            Screen::Dashboard
        } else if url.ends_with(AddressesPage::ROUTE) {
            Screen::Addresses
        } else if url.ends_with(ImportPage::ROUTE) {
            Screen::Import
        } else {
            return Err(E2eError::Playwright(format!("net::ERR_ABORTED at {}", url)));
        };
        self.navigate_to(&mut state, screen);
        Ok(())
    }

    async fn url(&self) -> E2eResult<String> {
        let state = self.state.lock().unwrap();
        Ok(format!("fake://{:?}", state.screen))
    }

    async fn title(&self) -> E2eResult<String> {
        let state = self.state.lock().unwrap();
        let title = match state.screen {
            Screen::Blank => "",
            Screen::Login => "Login • PrestaShop",
            Screen::Dashboard => "Dashboard • PrestaShop",
            Screen::Addresses => "Addresses • PrestaShop",
            Screen::Import => "Import • PrestaShop",
        };
        Ok(title.to_string())
    }

    async fn click(&self, selector: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        if !self.visible(&state, selector) {
            return Err(E2eError::NotFound(selector.to_string()));
        }
        if selector == DashboardPage::CUSTOMERS_PARENT_LINK {
            state.expanded = Some(DashboardPage::CUSTOMERS_PARENT_LINK);
        } else if selector == DashboardPage::ADVANCED_PARAMETERS_LINK {
            state.expanded = Some(DashboardPage::ADVANCED_PARAMETERS_LINK);
        } else if selector == SF_TOOLBAR_HIDE_BUTTON {
            state.toolbar_hidden = true;
        } else if selector == SAMPLE_FILES_TOGGLE {
            state.dropdown_open = !state.dropdown_open;
        }
        Ok(())
    }

    async fn hover(&self, selector: &str) -> E2eResult<()> {
        let state = self.state.lock().unwrap();
        if self.visible(&state, selector) {
            Ok(())
        } else {
            Err(E2eError::NotFound(selector.to_string()))
        }
    }

    async fn fill(&self, selector: &str, value: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        if !self.visible(&state, selector) {
            return Err(E2eError::NotFound(selector.to_string()));
        }
        match selector {
            "#email" => state.email = value.to_string(),
            "#passwd" => state.password = value.to_string(),
            _ => {
                let column = filter_column(selector).map(str::to_string);
                if let Some(column) = column {
                    state.pending.insert(column, value.to_string());
                }
            }
        }
        Ok(())
    }

    async fn select_option(&self, selector: &str, label: &str) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        let column = filter_column(selector)
            .filter(|_| self.visible(&state, selector))
            .map(str::to_string)
            .ok_or_else(|| E2eError::NotFound(selector.to_string()))?;
        state.pending.insert(column, label.to_string());
        Ok(())
    }

    async fn text_content(&self, selector: &str) -> E2eResult<String> {
        let state = self.state.lock().unwrap();
        if state.screen == Screen::Addresses {
            let rows = self.filtered(&state);
            if selector == GRID_TITLE {
                return Ok(format!("\n  Addresses ({})\n", rows.len()));
            }
            if let Some((row, column)) = parse_cell(selector) {
                return row
                    .checked_sub(1)
                    .and_then(|i| rows.get(i))
                    .and_then(|cells| cells.get(column))
                    .map(|text| format!(" {} ", text))
                    .ok_or_else(|| E2eError::NotFound(selector.to_string()));
            }
        }
        Err(E2eError::NotFound(selector.to_string()))
    }

    async fn count(&self, selector: &str) -> E2eResult<usize> {
        let state = self.state.lock().unwrap();
        if state.screen == Screen::Addresses && selector == format!("{} tbody tr:not(.empty_row)", GRID_TABLE) {
            return Ok(self.filtered(&state).len());
        }
        Ok(0)
    }

    async fn is_visible(&self, selector: &str) -> E2eResult<bool> {
        let state = self.state.lock().unwrap();
        Ok(self.visible(&state, selector))
    }

    async fn wait_for_selector(&self, selector: &str, wait: WaitState, _timeout: Duration) -> E2eResult<()> {
        let state = self.state.lock().unwrap();
        let visible = self.visible(&state, selector);
        let reached = match wait {
            WaitState::Visible | WaitState::Attached => visible,
            WaitState::Hidden | WaitState::Detached => !visible,
        };
        if reached {
            Ok(())
        } else {
            Err(E2eError::Timeout(format!("{} to be {}", selector, wait.as_str())))
        }
    }

    async fn click_and_wait_for_navigation(&self, selector: &str, _timeout: Duration) -> E2eResult<()> {
        let mut state = self.state.lock().unwrap();
        if !self.visible(&state, selector) {
            return Err(E2eError::Timeout(format!("{} to be visible", selector)));
        }
        if selector == "#submit_login" {
            let accepted = state.email == self.shared.email && state.password == self.shared.password;
            state.logged_in = accepted;
            let next = if accepted { Screen::Dashboard } else { Screen::Login };
            self.navigate_to(&mut state, next);
        } else if selector == format!("{} a", DashboardPage::ADDRESSES_LINK) {
            self.navigate_to(&mut state, Screen::Addresses);
        } else if selector == format!("{} a", DashboardPage::IMPORT_LINK) {
            self.navigate_to(&mut state, Screen::Import);
        } else if selector == format!("{} .grid-search-button", GRID_TABLE) {
            let pending = std::mem::take(&mut state.pending);
            state.applied.extend(pending.into_iter().filter(|(_, v)| !v.is_empty()));
        } else if selector == format!("{} .grid-reset-button", GRID_TABLE) {
            state.applied.clear();
            state.pending.clear();
        }
        Ok(())
    }

    async fn click_and_download(&self, selector: &str, dir: &Path, timeout: Duration) -> E2eResult<PathBuf> {
        let key = {
            let mut state = self.state.lock().unwrap();
            if !self.visible(&state, selector) {
                return Err(E2eError::NotFound(selector.to_string()));
            }
            state.dropdown_open = false;
            sample_key(selector).map(str::to_string)
        };
        let kind = key
            .as_deref()
            .and_then(|key| SampleFileKind::ALL.into_iter().find(|k| k.type_key() == key))
            .ok_or_else(|| E2eError::NotFound(selector.to_string()))?;

        if self.shared.faults.stalled_downloads.contains(kind.type_key()) {
            tokio::time::sleep(timeout).await;
            return Err(E2eError::Timeout(format!("download of {}", kind.type_key())));
        }

        let header = if self.shared.faults.corrupt_downloads.contains(kind.type_key()) {
            "<html>Access denied</html>"
        } else {
            kind.expected_header()
        };
        let path = dir.join(format!("{}.csv", kind.type_key()));
        tokio::fs::write(&path, format!("{}\n1;sample;row\n", header)).await?;
        self.shared.downloads.fetch_add(1, Ordering::SeqCst);
        Ok(path)
    }
}

/// Harness configuration writing into `dir`, with short timeouts
pub fn test_config(dir: &Path) -> HarnessConfig {
    let mut config = HarnessConfig {
        base_url: "http://shop.test/admin-dev/".to_string(),
        download_dir: dir.join("downloads"),
        output_dir: dir.join("results"),
        ..Default::default()
    };
    config.timeouts.download_ms = 200;
    config.timeouts.file_poll_ms = 20;
    config
}
