//! Wire shapes exchanged with the extension server and the package registry.
//!
//! Required fields are non-optional so that a response missing them fails
//! deserialization and is reported as a translation error for its channel.

use serde::{Deserialize, Serialize};

use crate::entry::{EntryStatus, PackageType};

/// One record of the installed-extensions listing returned by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct InstalledRecord {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: String,
    /// Defaults to `true` when the server omits it.
    #[serde(default = "default_true")]
    pub installed: bool,
    pub enabled: bool,
    pub latest_version: String,
    pub installed_version: String,
    #[serde(default)]
    pub status: Option<EntryStatus>,
    #[serde(default)]
    pub pkg_type: Option<PackageType>,
}

fn default_true() -> bool {
    true
}

/// Command sent to the extension server's action endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Install,
    Uninstall,
    Enable,
    Disable,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Uninstall => "uninstall",
            Self::Enable => "enable",
            Self::Disable => "disable",
        }
    }

    /// Present participle used in user-facing error titles.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Install => "installing",
            Self::Uninstall => "uninstalling",
            Self::Enable => "enabling",
            Self::Disable => "disabling",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an action POST.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ActionRequest {
    pub cmd: Action,
    pub extension_name: String,
}

/// Status reported by the server for an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Ok,
    Warning,
    Error,
}

/// Response to an action POST.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct ActionOutcome {
    #[serde(default)]
    pub status: Option<ActionStatus>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ActionOutcome {
    pub fn ok() -> Self {
        Self {
            status: Some(ActionStatus::Ok),
            message: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Some(ActionStatus::Ok)
    }
}

/// Result page of a registry search.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct SearchPage {
    pub objects: Vec<SearchObject>,
    pub total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SearchObject {
    pub package: RegistryPackage,
}

/// Package summary as published in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RegistryPackage {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub links: PackageLinks,
}

impl RegistryPackage {
    pub fn is_deprecated(&self) -> bool {
        self.keywords.iter().any(|k| k == "deprecated")
    }

    /// Homepage, then repository, then registry page.
    pub fn best_url(&self) -> String {
        self.links
            .homepage
            .clone()
            .or_else(|| self.links.repository.clone())
            .unwrap_or_else(|| self.links.npm.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct PackageLinks {
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
    pub npm: String,
}

/// State of the application build reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Building,
    Needed,
    Stable,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildStatus {
    pub status: BuildState,
    #[serde(default)]
    pub message: Option<String>,
}

/// A kernel available on the server, reduced to the fields companion rules
/// match against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KernelSpec {
    pub name: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub display_name: String,
}

/// Published package metadata; only the discovery section is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct PackageMetadata {
    #[serde(default)]
    pub jupyterlab: Option<LabMetadata>,
}

impl PackageMetadata {
    pub fn discovery(&self) -> Option<&Discovery> {
        self.jupyterlab.as_ref()?.discovery.as_ref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct LabMetadata {
    #[serde(default)]
    pub discovery: Option<Discovery>,
}

/// Companion packages a frontend extension asks to have installed alongside it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct Discovery {
    #[serde(default)]
    pub kernel: Option<Vec<KernelCompanionRule>>,
    #[serde(default)]
    pub server: Option<CompanionPackage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct KernelCompanionRule {
    pub kernel_spec: KernelSpecPattern,
    #[serde(flatten)]
    pub package: CompanionPackage,
}

/// Regular expressions matched against a kernel's language and display name.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct KernelSpecPattern {
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Install instructions for a companion package.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
pub struct CompanionPackage {
    #[serde(default)]
    pub base: Option<CompanionBase>,
    #[serde(default)]
    pub managers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CompanionBase {
    pub name: String,
}
