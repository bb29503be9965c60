//! Client for an npm-style package registry.

use async_trait::async_trait;
use labext_core::RegistrySearch;
use labext_core::schema::{PackageMetadata, SearchPage};
use reqwest::StatusCode;
use url::Url;

use crate::settings::ServerConnectionSettings;
use crate::transport::{decode, send};
use crate::{Error, Result};

/// Keyword every listed package must carry.
pub const EXTENSION_KEYWORD: &str = "jupyterlab-extension";

/// Registry search and metadata over HTTP.
#[derive(Debug, Clone)]
pub struct NpmRegistry {
    http: reqwest::Client,
    settings: ServerConnectionSettings,
}

impl NpmRegistry {
    pub fn new(settings: ServerConnectionSettings) -> Self {
        Self::with_client(reqwest::Client::new(), settings)
    }

    pub fn with_client(http: reqwest::Client, settings: ServerConnectionSettings) -> Self {
        Self { http, settings }
    }

    /// `-/v1/search?text=<query> keywords:"jupyterlab-extension"&size=<n>&from=<page*n>`
    pub fn search_url(&self, query: &str, page: usize, page_size: usize) -> Result<Url> {
        let from = page
            .checked_mul(page_size)
            .ok_or(Error::PageOutOfRange { page, page_size })?;
        let mut url = self.settings.registry_endpoint("-/v1/search")?;
        url.query_pairs_mut()
            .append_pair("text", &format!("{query} keywords:\"{EXTENSION_KEYWORD}\""))
            .append_pair("size", &page_size.to_string())
            .append_pair("from", &from.to_string());
        Ok(url)
    }

    pub async fn search_page(&self, query: &str, page: usize, page_size: usize) -> Result<SearchPage> {
        let url = self.search_url(query, page, page_size)?;
        tracing::debug!(%url, "Searching registry");
        let response = send(self.http.get(url)).await?;
        decode(response, "search result").await
    }

    /// Metadata for `name` at `version`; `None` if the registry answers 404.
    pub async fn fetch_metadata(&self, name: &str, version: &str) -> Result<Option<PackageMetadata>> {
        let url = self.settings.registry_endpoint(&format!("{name}/{version}"))?;
        tracing::debug!(%url, "Fetching package metadata");
        let response = self.http.get(url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::from_status(response.status()));
        }
        decode(response, "package metadata").await.map(Some)
    }
}

#[async_trait]
impl RegistrySearch for NpmRegistry {
    async fn search(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> labext_core::Result<SearchPage> {
        Ok(self.search_page(query, page, page_size).await?)
    }

    async fn package_metadata(
        &self,
        name: &str,
        version: &str,
    ) -> labext_core::Result<Option<PackageMetadata>> {
        Ok(self.fetch_metadata(name, version).await?)
    }
}
