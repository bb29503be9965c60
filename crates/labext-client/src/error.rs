//! Error types for the HTTP clients

use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while talking to the server or the registry
#[derive(Debug, Error)]
pub enum Error {
    /// Network failure before a response was received
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx response
    #[error("{status} ({status_text})")]
    Status { status: u16, status_text: String },

    /// Response body that does not match its expected shape
    #[error("invalid {what}: {source}")]
    Json {
        what: &'static str,
        source: serde_json::Error,
    },

    /// Malformed base or endpoint URL
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed configuration file
    #[error("config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Search page whose result offset does not fit in a `usize`
    #[error("search page {page} with page size {page_size} is out of range")]
    PageOutOfRange { page: usize, page_size: usize },
}

impl Error {
    /// Build a status error with the canonical reason phrase, e.g.
    /// `500 (Internal Server Error)`.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        Self::Status {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        }
    }
}

impl From<Error> for labext_core::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Json { what, source } => labext_core::Error::schema(what, source.to_string()),
            Error::Http(_) | Error::Status { .. } | Error::Url(_) => {
                labext_core::Error::Transport(err.to_string())
            }
            Error::Io(_) | Error::ConfigParse(_) | Error::PageOutOfRange { .. } => {
                labext_core::Error::Backend(err.to_string())
            }
        }
    }
}
