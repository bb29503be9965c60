//! Server-provided block and allow lists.

use serde::{Deserialize, Serialize};

use crate::entry::Entry;
use crate::error::{Error, Result};

/// A single rule of a block or allow list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ListingEntry {
    /// Extension name the rule applies to.
    pub name: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub creation_date: Option<String>,
    #[serde(default)]
    pub last_update_date: Option<String>,
}

/// Which list, if any, governs installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    /// Neither list is populated.
    #[default]
    Default,
    /// Only the block list is populated.
    Block,
    /// Only the allow list is populated.
    Allow,
    /// Both lists are populated; neither is enforced.
    Invalid,
}

/// Listings document served by the extension server.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Listings {
    #[serde(default)]
    pub blocked_extensions_uris: Vec<String>,
    #[serde(default)]
    pub allowed_extensions_uris: Vec<String>,
    #[serde(default)]
    pub blocked_extensions: Vec<ListingEntry>,
    #[serde(default)]
    pub allowed_extensions: Vec<ListingEntry>,
}

impl Listings {
    /// Create an empty listing (mode [`ListMode::Default`]).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mode(&self) -> ListMode {
        match (
            self.blocked_extensions.is_empty(),
            self.allowed_extensions.is_empty(),
        ) {
            (true, true) => ListMode::Default,
            (false, true) => ListMode::Block,
            (true, false) => ListMode::Allow,
            (false, false) => ListMode::Invalid,
        }
    }

    /// Look up the block rule for an extension name.
    pub fn blocked(&self, name: &str) -> Option<&ListingEntry> {
        self.blocked_extensions.iter().find(|e| e.name == name)
    }

    /// Look up the allow rule for an extension name.
    pub fn allowed(&self, name: &str) -> Option<&ListingEntry> {
        self.allowed_extensions.iter().find(|e| e.name == name)
    }

    /// Attach the matching rules to a freshly built entry.
    pub fn annotate(&self, entry: &mut Entry) {
        match self.mode() {
            ListMode::Block => entry.blocked_entry = self.blocked(&entry.name).cloned(),
            ListMode::Allow => entry.allowed_entry = self.allowed(&entry.name).cloned(),
            ListMode::Default | ListMode::Invalid => {}
        }
    }

    /// Reject installation of an entry the active list forbids.
    pub fn check_installable(&self, entry: &Entry) -> Result<()> {
        match self.mode() {
            ListMode::Block => match self.blocked(&entry.name) {
                Some(rule) => Err(Error::Blocked {
                    name: entry.name.clone(),
                    reason: rule.reason.clone(),
                }),
                None => Ok(()),
            },
            ListMode::Allow if self.allowed(&entry.name).is_none() => {
                Err(Error::NotAllowed(entry.name.clone()))
            }
            _ => Ok(()),
        }
    }
}
