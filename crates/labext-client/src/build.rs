//! Client for the application build endpoint.

use async_trait::async_trait;
use labext_core::BuildService;
use labext_core::schema::BuildStatus;

use crate::settings::ServerConnectionSettings;
use crate::transport::{decode, send};
use crate::Result;

pub const BUILD_PATH: &str = "lab/api/build";

/// Build service over HTTP.
///
/// `GET` reports status, `POST` starts a build (and waits for it), `DELETE`
/// cancels one.
#[derive(Debug, Clone)]
pub struct BuildClient {
    http: reqwest::Client,
    settings: ServerConnectionSettings,
    available: bool,
}

impl BuildClient {
    pub fn new(settings: ServerConnectionSettings, available: bool) -> Self {
        Self::with_client(reqwest::Client::new(), settings, available)
    }

    pub fn with_client(
        http: reqwest::Client,
        settings: ServerConnectionSettings,
        available: bool,
    ) -> Self {
        Self {
            http,
            settings,
            available,
        }
    }

    pub async fn fetch_status(&self) -> Result<BuildStatus> {
        let url = self.settings.server_endpoint(BUILD_PATH)?;
        let response = send(self.settings.authorize(self.http.get(url))).await?;
        decode(response, "build status").await
    }

    pub async fn start(&self) -> Result<()> {
        let url = self.settings.server_endpoint(BUILD_PATH)?;
        tracing::debug!(%url, "Starting build");
        send(self.settings.authorize(self.http.post(url))).await?;
        Ok(())
    }

    pub async fn stop(&self) -> Result<()> {
        let url = self.settings.server_endpoint(BUILD_PATH)?;
        tracing::debug!(%url, "Cancelling build");
        send(self.settings.authorize(self.http.delete(url))).await?;
        Ok(())
    }
}

#[async_trait]
impl BuildService for BuildClient {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn status(&self) -> labext_core::Result<BuildStatus> {
        Ok(self.fetch_status().await?)
    }

    async fn build(&self) -> labext_core::Result<()> {
        Ok(self.start().await?)
    }

    async fn cancel(&self) -> labext_core::Result<()> {
        Ok(self.stop().await?)
    }
}
