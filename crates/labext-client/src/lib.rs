//! HTTP implementations of the extension manager's collaborators.
//!
//! - [`ServerClient`] talks to the local extension server: installed
//!   extensions, actions, listings and kernel specs.
//! - [`BuildClient`] drives the application build endpoint.
//! - [`NpmRegistry`] searches an npm-style registry and fetches package
//!   metadata.
//!
//! All clients take a [`ServerConnectionSettings`] explicitly.
//! [`ConfigResolver`] builds one from layered TOML files and the environment.

pub mod build;
pub mod config;
pub mod error;
pub mod registry;
pub mod server;
pub mod settings;
mod transport;

pub use build::BuildClient;
pub use config::{ClientConfig, ConfigFile, ConfigResolver};
pub use error::{Error, Result};
pub use registry::NpmRegistry;
pub use server::ServerClient;
pub use settings::ServerConnectionSettings;
