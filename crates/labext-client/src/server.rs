//! Client for the local extension server.

use std::collections::BTreeMap;

use async_trait::async_trait;
use labext_core::schema::{Action, ActionOutcome, ActionRequest, InstalledRecord, KernelSpec};
use labext_core::{ExtensionServer, KernelSpecSource, Listings};
use serde::Deserialize;

use crate::settings::ServerConnectionSettings;
use crate::transport::{decode, send};
use crate::Result;

/// Installed-extension listing and action endpoint.
pub const EXTENSIONS_PATH: &str = "lab/api/extensions";

/// Block/allow listings document.
pub const LISTINGS_PATH: &str =
    "lab/api/listings/@jupyterlab/extensionmanager-extension/listings.json";

/// Kernel specs available on the server.
pub const KERNELSPECS_PATH: &str = "api/kernelspecs";

/// Extension server over HTTP.
#[derive(Debug, Clone)]
pub struct ServerClient {
    http: reqwest::Client,
    settings: ServerConnectionSettings,
}

#[derive(Debug, Deserialize)]
struct KernelSpecsDocument {
    #[serde(default)]
    kernelspecs: Option<BTreeMap<String, KernelSpecModel>>,
}

#[derive(Debug, Deserialize)]
struct KernelSpecModel {
    name: String,
    spec: KernelSpecBody,
}

#[derive(Debug, Deserialize)]
struct KernelSpecBody {
    #[serde(default)]
    language: String,
    #[serde(default)]
    display_name: String,
}

impl ServerClient {
    pub fn new(settings: ServerConnectionSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    /// Share an existing connection pool.
    pub fn with_client(http: reqwest::Client, settings: ServerConnectionSettings) -> Self {
        Self { http, settings }
    }

    pub fn settings(&self) -> &ServerConnectionSettings {
        &self.settings
    }

    pub async fn fetch_installed(&self, refresh: bool) -> Result<Vec<InstalledRecord>> {
        let mut url = self.settings.server_endpoint(EXTENSIONS_PATH)?;
        if refresh {
            url.query_pairs_mut().append_pair("refresh", "1");
        }
        tracing::debug!(%url, "Querying installed extensions");
        let response = send(self.settings.authorize(self.http.get(url))).await?;
        decode(response, "installed list").await
    }

    pub async fn post_action(&self, action: Action, extension_name: &str) -> Result<ActionOutcome> {
        let url = self.settings.server_endpoint(EXTENSIONS_PATH)?;
        let body = ActionRequest {
            cmd: action,
            extension_name: extension_name.to_string(),
        };
        tracing::debug!(%url, %action, extension_name, "Posting extension action");
        let response = send(self.settings.authorize(self.http.post(url).json(&body))).await?;
        decode(response, "action response").await
    }

    pub async fn fetch_listings(&self) -> Result<Listings> {
        let url = self.settings.server_endpoint(LISTINGS_PATH)?;
        let response = send(self.settings.authorize(self.http.get(url))).await?;
        decode(response, "listings").await
    }

    /// Kernel specs keyed by name, flattened to what companion rules match on.
    pub async fn fetch_kernel_specs(&self) -> Result<Option<Vec<KernelSpec>>> {
        let url = self.settings.server_endpoint(KERNELSPECS_PATH)?;
        let response = send(self.settings.authorize(self.http.get(url))).await?;
        let document: KernelSpecsDocument = decode(response, "kernel specs").await?;
        Ok(document.kernelspecs.map(|specs| {
            specs
                .into_values()
                .map(|model| KernelSpec {
                    name: model.name,
                    language: model.spec.language,
                    display_name: model.spec.display_name,
                })
                .collect()
        }))
    }
}

#[async_trait]
impl ExtensionServer for ServerClient {
    async fn installed(&self, refresh: bool) -> labext_core::Result<Vec<InstalledRecord>> {
        Ok(self.fetch_installed(refresh).await?)
    }

    async fn perform_action(
        &self,
        action: Action,
        extension_name: &str,
    ) -> labext_core::Result<ActionOutcome> {
        Ok(self.post_action(action, extension_name).await?)
    }

    async fn listings(&self) -> labext_core::Result<Listings> {
        Ok(self.fetch_listings().await?)
    }
}

#[async_trait]
impl KernelSpecSource for ServerClient {
    async fn kernel_specs(&self) -> labext_core::Result<Option<Vec<KernelSpec>>> {
        Ok(self.fetch_kernel_specs().await?)
    }
}
