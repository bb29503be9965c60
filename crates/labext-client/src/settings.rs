//! Connection settings shared by every client.

use reqwest::RequestBuilder;
use reqwest::header::AUTHORIZATION;
use url::Url;

use crate::Result;

/// Public npm registry used when none is configured.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.npmjs.org/";

/// Where the extension server and the registry live, and how to
/// authenticate against the server.
///
/// Base URLs always end with `/` so that relative endpoint paths join under
/// them instead of replacing their last segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConnectionSettings {
    pub base_url: Url,
    pub token: Option<String>,
    pub registry_url: Url,
}

impl ServerConnectionSettings {
    /// Settings for a server at `base_url` using the public registry.
    pub fn new(base_url: &str) -> Result<Self> {
        Ok(Self {
            base_url: directory_url(base_url)?,
            token: None,
            registry_url: directory_url(DEFAULT_REGISTRY_URL)?,
        })
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_registry_url(mut self, registry_url: &str) -> Result<Self> {
        self.registry_url = directory_url(registry_url)?;
        Ok(self)
    }

    /// Resolve `path` against the server base URL.
    pub fn server_endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Resolve `path` against the registry URL.
    pub fn registry_endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.registry_url.join(path)?)
    }

    /// Attach the server token, if any.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("token {token}")),
            None => request,
        }
    }
}

fn directory_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}
