//! Layered configuration for the clients and the model.
//!
//! Sources are merged in this order, later sources overriding earlier ones:
//!
//! 1. **Global** - `<config_dir>/labext/config.toml`
//! 2. **Project** - `.labext.toml` in the working directory
//! 3. **Environment** - `LABEXT_BASE_URL`, `LABEXT_TOKEN`, `LABEXT_REGISTRY_URL`
//!
//! ```toml
//! [server]
//! base_url = "http://localhost:8888"
//! token = "abc123"
//!
//! [registry]
//! url = "https://registry.npmjs.org"
//! page_size = 30
//!
//! [model]
//! trusted_namespace = "@jupyterlab"
//!
//! [build]
//! available = true
//! ```

mod file;
mod resolver;

pub use file::{BuildSection, ConfigFile, ModelSection, RegistrySection, ServerSection};
pub use resolver::{
    ClientConfig, ConfigResolver, DEFAULT_BASE_URL, ENV_BASE_URL, ENV_REGISTRY_URL, ENV_TOKEN,
    PROJECT_CONFIG_FILE,
};
