//! Collaborators the model talks to.
//!
//! The model never performs I/O itself; every request goes through one of
//! these traits so that HTTP clients and in-memory fakes are interchangeable.

use std::sync::Arc;

use async_trait::async_trait;

use crate::companion::CompanionRequest;
use crate::error::Result;
use crate::listing::Listings;
use crate::schema::{
    Action, ActionOutcome, BuildStatus, InstalledRecord, KernelSpec, PackageMetadata, SearchPage,
};

/// Package registry search and metadata lookup.
#[async_trait]
pub trait RegistrySearch: Send + Sync {
    /// Fetch one page of packages matching `query`. `page` is zero-based.
    async fn search(&self, query: &str, page: usize, page_size: usize) -> Result<SearchPage>;

    /// Fetch published metadata for `name` at `version`.
    ///
    /// Returns `Ok(None)` when the registry has no such package version.
    async fn package_metadata(&self, name: &str, version: &str)
    -> Result<Option<PackageMetadata>>;
}

/// Local extension server.
#[async_trait]
pub trait ExtensionServer: Send + Sync {
    /// Query installed extensions, bypassing the server cache if `refresh`.
    async fn installed(&self, refresh: bool) -> Result<Vec<InstalledRecord>>;

    /// Issue an install/uninstall/enable/disable command.
    async fn perform_action(&self, action: Action, extension_name: &str) -> Result<ActionOutcome>;

    /// Fetch the block/allow listings.
    async fn listings(&self) -> Result<Listings>;
}

/// Application build endpoint.
#[async_trait]
pub trait BuildService: Send + Sync {
    fn is_available(&self) -> bool;
    async fn status(&self) -> Result<BuildStatus>;
    async fn build(&self) -> Result<()>;
    async fn cancel(&self) -> Result<()>;
}

/// Source of the kernel specs available on the server.
#[async_trait]
pub trait KernelSpecSource: Send + Sync {
    /// `Ok(None)` when the server reports no kernel specs document.
    async fn kernel_specs(&self) -> Result<Option<Vec<KernelSpec>>>;
}

/// Asks the user whether to proceed with an install that has companions.
#[async_trait]
pub trait CompanionPrompt: Send + Sync {
    async fn confirm(&self, request: &CompanionRequest) -> bool;
}

/// Surfaces failures that do not propagate to the caller.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, title: &str, message: &str);
}

/// Reports errors through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, title: &str, message: &str) {
        tracing::error!(%title, "{message}");
    }
}

/// Build service for deployments without build support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBuild;

#[async_trait]
impl BuildService for NoBuild {
    fn is_available(&self) -> bool {
        false
    }

    async fn status(&self) -> Result<BuildStatus> {
        Err(crate::Error::Backend("build is not available".to_string()))
    }

    async fn build(&self) -> Result<()> {
        Err(crate::Error::Backend("build is not available".to_string()))
    }

    async fn cancel(&self) -> Result<()> {
        Err(crate::Error::Backend("build is not available".to_string()))
    }
}

/// Everything a [`ListModel`](crate::ListModel) needs from the outside world.
#[derive(Clone)]
pub struct Services {
    pub registry: Arc<dyn RegistrySearch>,
    pub server: Arc<dyn ExtensionServer>,
    pub builder: Arc<dyn BuildService>,
    pub kernelspecs: Arc<dyn KernelSpecSource>,
    pub prompt: Arc<dyn CompanionPrompt>,
    pub reporter: Arc<dyn ErrorReporter>,
}
