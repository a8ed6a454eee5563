//! Per-test context tagging
//!
//! Every step of a suite tags the running test case with named values
//! (the step identifier, mostly) so reports can be traced back to the
//! suite and step that produced them. Entries are diagnostic only and
//! never drive control flow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key used to tag a case with its step identifier
pub const TEST_IDENTIFIER: &str = "testIdentifier";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextLogEntry {
    /// Sequence number of the case within its suite
    pub case: usize,
    /// Title of the test case the entry belongs to
    pub test: String,
    pub key: String,
    pub value: String,
    pub base_context: String,
    pub recorded_at: DateTime<Utc>,
}

impl ContextLogEntry {
    /// `<base context>_<value>`, unique across the whole campaign
    pub fn qualified_value(&self) -> String {
        format!("{}_{}", self.base_context, self.value)
    }
}

/// A case opened in a [`ContextTracker`]. Titles repeat across cases
/// (every reset on a column shares one), so entries are keyed on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CaseKey(usize);

impl CaseKey {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Append-only log of context entries for one suite
#[derive(Debug, Clone, Default)]
pub struct ContextTracker {
    base_context: String,
    titles: Vec<String>,
    entries: Vec<ContextLogEntry>,
}

impl ContextTracker {
    pub fn new(base_context: impl Into<String>) -> Self {
        Self {
            base_context: base_context.into(),
            titles: Vec::new(),
            entries: Vec::new(),
        }
    }

    pub fn base_context(&self) -> &str {
        &self.base_context
    }

    /// Open a new case and tag it with its step identifier
    pub fn open_case(&mut self, test: &str, identifier: &str) -> CaseKey {
        let key = CaseKey(self.titles.len());
        self.titles.push(test.to_string());
        self.add_context_item(key, TEST_IDENTIFIER, identifier);
        key
    }

    pub fn add_context_item(&mut self, case: CaseKey, key: &str, value: &str) -> &ContextLogEntry {
        let entry = ContextLogEntry {
            case: case.0,
            test: self.titles.get(case.0).cloned().unwrap_or_default(),
            key: key.to_string(),
            value: value.to_string(),
            base_context: self.base_context.clone(),
            recorded_at: Utc::now(),
        };
        debug!("[{}] {} = {}", entry.test, entry.key, entry.qualified_value());
        self.entries.push(entry);
        // Just pushed
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ContextLogEntry] {
        &self.entries
    }

    pub fn entries_for(&self, case: CaseKey) -> impl Iterator<Item = &ContextLogEntry> + '_ {
        self.entries.iter().filter(move |e| e.case == case.0)
    }

    /// Identifier the case was last tagged with
    pub fn identifier_of(&self, case: CaseKey) -> Option<&str> {
        self.entries_for(case)
            .filter(|e| e.key == TEST_IDENTIFIER)
            .last()
            .map(|e| e.value.as_str())
    }
}
