//! One parsed configuration file.

use serde::{Deserialize, Serialize};

use crate::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub base_url: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySection {
    pub url: Option<String>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub trusted_namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildSection {
    pub available: Option<bool>,
}

/// Contents of a single `config.toml` / `.labext.toml`.
///
/// Every key is optional so that a layer only overrides what it sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub server: ServerSection,
    pub registry: RegistrySection,
    pub model: ModelSection,
    pub build: BuildSection,
}

impl ConfigFile {
    /// Parse a configuration file from TOML content
    ///
    /// # Example
    ///
    /// ```
    /// use labext_client::ConfigFile;
    ///
    /// let file = ConfigFile::parse(r#"
    /// [server]
    /// base_url = "http://localhost:8888"
    /// "#).unwrap();
    ///
    /// assert_eq!(file.server.base_url.as_deref(), Some("http://localhost:8888"));
    /// assert_eq!(file.build.available, None);
    /// ```
    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overlay `other` on top of this file; keys set in `other` win.
    pub fn merge(&mut self, other: &ConfigFile) {
        overlay(&mut self.server.base_url, &other.server.base_url);
        overlay(&mut self.server.token, &other.server.token);
        overlay(&mut self.registry.url, &other.registry.url);
        overlay(&mut self.registry.page_size, &other.registry.page_size);
        overlay(&mut self.model.trusted_namespace, &other.model.trusted_namespace);
        overlay(&mut self.build.available, &other.build.available);
    }
}

fn overlay<T: Clone>(base: &mut Option<T>, other: &Option<T>) {
    if other.is_some() {
        base.clone_from(other);
    }
}
