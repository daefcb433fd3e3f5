use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::MemoryConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    ErrorLog,
    DelegationHistory,
    Patterns,
}

impl Section {
    pub const ALL: [Section; 3] = [Section::ErrorLog, Section::DelegationHistory, Section::Patterns];

    pub fn as_str(&self) -> &'static str {
        match self {
            Section::ErrorLog => "error_log",
            Section::DelegationHistory => "delegation_history",
            Section::Patterns => "patterns",
        }
    }

    /// Heading used when rendering a briefing
    pub fn title(&self) -> &'static str {
        match self {
            Section::ErrorLog => "RECENT ERRORS",
            Section::DelegationHistory => "RECENT DELEGATIONS",
            Section::Patterns => "KNOWN PATTERNS",
        }
    }

    pub fn cap(&self, config: &MemoryConfig) -> usize {
        match self {
            Section::ErrorLog => config.max_error_log,
            Section::DelegationHistory => config.max_delegation_history,
            Section::Patterns => config.max_patterns,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One remembered observation.
/// `kind` is an error type, a task category, or a pattern name depending on the section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryEntry {
    pub kind: String,
    pub message: String,
    pub timestamp: Option<DateTime<Utc>>,
    pub occurrences: u64,
    pub success: Option<bool>,
}

impl MemoryEntry {
    pub fn new<K, M>(kind: K, message: M) -> Self
    where
        K: Into<String>,
        M: Into<String>,
    {
        Self {
            kind: kind.into(),
            message: message.into(),
            timestamp: None,
            occurrences: 1,
            success: None,
        }
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn with_occurrences(mut self, occurrences: u64) -> Self {
        self.occurrences = occurrences;
        self
    }

    /// Text indexed for free-text retrieval
    pub fn text(&self) -> String {
        format!("{} {}", self.kind, self.message)
    }
}
