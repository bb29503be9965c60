//! Session setup
//!
//! Resolves configuration from the working directory and wires the HTTP
//! clients into a [`ListModel`].

use std::path::Path;
use std::sync::Arc;

use labext_client::{BuildClient, ConfigResolver, NpmRegistry, ServerClient};
use labext_core::{CompanionPrompt, Entry, ListModel, Services};

use crate::error::{CliError, Result};
use crate::interactive::{AutoApprove, ConsoleReporter, DialoguerPrompt};

/// A model connected to the configured server.
pub struct Session {
    pub model: ListModel,
    pub reporter: Arc<ConsoleReporter>,
}

impl Session {
    /// Open a session for the project in `root`. With `assume_yes`, companion
    /// prompts are approved without asking.
    pub fn open(root: &Path, assume_yes: bool) -> Result<Self> {
        let config = ConfigResolver::new(root).resolve()?;
        tracing::debug!(
            base_url = %config.settings.base_url,
            registry_url = %config.settings.registry_url,
            "Resolved configuration"
        );

        let http = reqwest::Client::new();
        let server = Arc::new(ServerClient::with_client(http.clone(), config.settings.clone()));
        let prompt: Arc<dyn CompanionPrompt> = if assume_yes {
            Arc::new(AutoApprove)
        } else {
            Arc::new(DialoguerPrompt)
        };
        let reporter = Arc::new(ConsoleReporter::new());

        let services = Services {
            registry: Arc::new(NpmRegistry::with_client(http.clone(), config.settings.clone())),
            server: server.clone(),
            builder: Arc::new(BuildClient::with_client(
                http,
                config.settings,
                config.build_available,
            )),
            kernelspecs: server,
            prompt,
            reporter: reporter.clone(),
        };

        Ok(Self {
            model: ListModel::new(services, config.model),
            reporter,
        })
    }

    /// Find `name`, preferring the installed view, then searching for it.
    pub async fn resolve_entry(&self, name: &str) -> Result<Entry> {
        if let Some(entry) = self.model.installed().iter().find(|e| e.name == name) {
            return Ok(entry.clone());
        }

        self.model.set_query(Some(name.to_string())).await?;
        if let Some(error) = self.model.search_error() {
            return Err(CliError::user(format!("Search for '{name}' failed: {error}")));
        }
        self.model
            .find(name)
            .ok_or_else(|| CliError::user(format!("No extension named '{name}' found")))
    }

    /// Wait for the build check the last action started and tell the user
    /// if a rebuild is recommended.
    pub async fn settle_build(&self) -> Result<()> {
        self.model.settle_build_check().await?;
        if self.model.prompt_build() {
            println!(
                "A rebuild is recommended. Run `labext build` to rebuild the application."
            );
        }
        Ok(())
    }
}
