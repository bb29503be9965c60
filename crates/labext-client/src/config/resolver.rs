//! Configuration resolution with layered overrides

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use labext_core::ModelOptions;

use super::file::ConfigFile;
use crate::Result;
use crate::settings::ServerConnectionSettings;

/// Server assumed when no layer sets one.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8888/";

pub const ENV_BASE_URL: &str = "LABEXT_BASE_URL";
pub const ENV_TOKEN: &str = "LABEXT_TOKEN";
pub const ENV_REGISTRY_URL: &str = "LABEXT_REGISTRY_URL";

/// Project-level configuration file name.
pub const PROJECT_CONFIG_FILE: &str = ".labext.toml";

/// The effective configuration after merging all layers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub settings: ServerConnectionSettings,
    pub model: ModelOptions,
    pub build_available: bool,
}

/// Resolves configuration by merging the global file, the project file and
/// the environment.
pub struct ConfigResolver {
    /// Directory searched for the project file.
    root: PathBuf,

    /// Override for the global config directory (used for testing).
    /// When `None`, `dirs::config_dir()` is used.
    global_config_dir_override: Option<PathBuf>,

    /// Override for the process environment (used for testing).
    env_override: Option<HashMap<String, String>>,
}

impl ConfigResolver {
    /// Create a resolver for the project rooted at `root`.
    ///
    /// The global file lives at:
    /// - Linux: `~/.config/labext/config.toml`
    /// - macOS: `~/Library/Application Support/labext/config.toml`
    /// - Windows: `%APPDATA%\labext\config.toml`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            global_config_dir_override: None,
            env_override: None,
        }
    }

    /// Use `dir` instead of the platform config directory.
    pub fn with_global_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.global_config_dir_override = Some(dir.into());
        self
    }

    /// Read environment overrides from `vars` instead of the process
    /// environment.
    pub fn with_env(mut self, vars: HashMap<String, String>) -> Self {
        self.env_override = Some(vars);
        self
    }

    fn global_config_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.global_config_dir_override {
            return Some(dir.clone());
        }
        dirs::config_dir().map(|d| d.join("labext"))
    }

    fn env(&self, key: &str) -> Option<String> {
        let value = match &self.env_override {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Merge every layer into one file. Missing files are skipped; malformed
    /// TOML is an error.
    pub fn load(&self) -> Result<ConfigFile> {
        let mut config = ConfigFile::default();

        // Layer 1 - global
        if let Some(global_dir) = self.global_config_dir() {
            load_layer(&mut config, &global_dir.join("config.toml"), "global")?;
        }

        // Layer 2 - project
        load_layer(&mut config, &self.root.join(PROJECT_CONFIG_FILE), "project")?;

        // Layer 3 - environment
        if let Some(base_url) = self.env(ENV_BASE_URL) {
            config.server.base_url = Some(base_url);
        }
        if let Some(token) = self.env(ENV_TOKEN) {
            config.server.token = Some(token);
        }
        if let Some(registry_url) = self.env(ENV_REGISTRY_URL) {
            config.registry.url = Some(registry_url);
        }

        Ok(config)
    }

    /// Resolve the effective configuration.
    pub fn resolve(&self) -> Result<ClientConfig> {
        let file = self.load()?;

        let base_url = file.server.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let mut settings = ServerConnectionSettings::new(base_url)?;
        if let Some(token) = file.server.token {
            settings = settings.with_token(token);
        }
        if let Some(registry_url) = file.registry.url.as_deref() {
            settings = settings.with_registry_url(registry_url)?;
        }

        let defaults = ModelOptions::default();
        let model = ModelOptions {
            trusted_namespace: file
                .model
                .trusted_namespace
                .unwrap_or(defaults.trusted_namespace),
            page_size: file.registry.page_size.unwrap_or(defaults.page_size),
        };

        Ok(ClientConfig {
            settings,
            model,
            build_available: file.build.available.unwrap_or(true),
        })
    }
}

fn load_layer(config: &mut ConfigFile, path: &Path, layer: &str) -> Result<()> {
    if !path.is_file() {
        tracing::debug!(?path, layer, "No config found, skipping");
        return Ok(());
    }
    tracing::debug!(?path, layer, "Loading config");
    let content = fs::read_to_string(path)?;
    config.merge(&ConfigFile::parse(&content)?);
    Ok(())
}
