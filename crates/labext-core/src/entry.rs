//! The [`Entry`] record shown in both views, and its translation from wire data.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::listing::ListingEntry;
use crate::schema::{InstalledRecord, RegistryPackage, SearchPage};
use crate::version;

/// Health of an extension as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Ok,
    Warning,
    Error,
    Deprecated,
    /// No status reported (registry results, or a `null` from the server).
    #[default]
    Absent,
}

/// How an installed extension was packaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    Prebuilt,
    #[default]
    Source,
}

/// One extension's known state, merged from registry and/or server data.
///
/// Entries are rebuilt on every reconciliation pass and never patched in
/// place. An entry that is not installed has no installed version and is
/// never enabled.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Entry {
    pub name: String,
    pub description: String,
    pub url: String,
    pub installed: bool,
    pub enabled: bool,
    pub status: EntryStatus,
    pub latest_version: String,
    /// Empty when not installed.
    pub installed_version: String,
    pub pkg_type: PackageType,
    /// Block-list rule matching this extension, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked_entry: Option<ListingEntry>,
    /// Allow-list rule matching this extension, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_entry: Option<ListingEntry>,
}

/// Entries keyed by name, in the order the upstream channel supplied them.
pub type EntryMap = IndexMap<String, Entry>;

impl Entry {
    /// Build an entry for a package found in the registry but not yet
    /// reconciled with the server.
    pub fn from_registry(pkg: &RegistryPackage) -> Result<Self> {
        if pkg.name.is_empty() {
            return Err(Error::schema("search result", "package with empty name"));
        }
        Ok(Self {
            name: pkg.name.clone(),
            description: pkg.description.clone(),
            url: pkg.best_url(),
            installed: false,
            enabled: false,
            status: EntryStatus::Absent,
            latest_version: pkg.version.clone(),
            installed_version: String::new(),
            pkg_type: PackageType::default(),
            blocked_entry: None,
            allowed_entry: None,
        })
    }

    /// Build an entry from the server's installed listing.
    pub fn from_installed(record: InstalledRecord) -> Result<Self> {
        if record.name.is_empty() {
            return Err(Error::schema("installed list", "record with empty name"));
        }
        let installed = record.installed;
        Ok(Self {
            name: record.name,
            description: record.description,
            url: record.url,
            installed,
            enabled: installed && record.enabled,
            status: record.status.unwrap_or_default(),
            latest_version: record.latest_version,
            installed_version: if installed {
                record.installed_version
            } else {
                String::new()
            },
            pkg_type: record.pkg_type.unwrap_or_default(),
            blocked_entry: None,
            allowed_entry: None,
        })
    }

    pub fn is_deprecated(&self) -> bool {
        self.status == EntryStatus::Deprecated
    }

    /// Whether a newer version than the installed one has been published.
    pub fn has_update(&self) -> bool {
        self.installed
            && !self.latest_version.is_empty()
            && version::is_newer(&self.installed_version, &self.latest_version)
    }
}

/// Whether a newer version of `entry` than the installed one is available.
pub fn entry_has_update(entry: &Entry) -> bool {
    entry.has_update()
}

/// Translate a registry page into entries, dropping deprecated packages.
pub fn translate_search(page: &SearchPage) -> Result<EntryMap> {
    let mut entries = EntryMap::new();
    for object in &page.objects {
        let pkg = &object.package;
        if pkg.is_deprecated() {
            tracing::debug!(name = %pkg.name, "Skipping deprecated package");
            continue;
        }
        let entry = Entry::from_registry(pkg)?;
        entries.insert(entry.name.clone(), entry);
    }
    Ok(entries)
}

/// Translate the server's installed listing into entries.
pub fn translate_installed(records: Vec<InstalledRecord>) -> Result<EntryMap> {
    let mut entries = EntryMap::new();
    for record in records {
        let entry = Entry::from_installed(record)?;
        entries.insert(entry.name.clone(), entry);
    }
    Ok(entries)
}
