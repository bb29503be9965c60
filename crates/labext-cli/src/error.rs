//! Error types for labext-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from the extension manager model
    #[error(transparent)]
    Core(#[from] labext_core::Error),

    /// Error from the HTTP clients or configuration
    #[error(transparent)]
    Client(#[from] labext_client::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// A background model task panicked or was cancelled
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    /// Failure that the error reporter has already printed
    #[error("{0}")]
    Reported(String),

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }

    /// Wrap an error returned by a model action.
    ///
    /// Precondition failures are raised before anything is reported; every
    /// other action failure has already gone through the reporter.
    pub fn from_action(err: labext_core::Error) -> Self {
        if err.is_precondition() {
            Self::Core(err)
        } else {
            Self::Reported(err.to_string())
        }
    }

    /// Whether `main` still needs to print this error.
    pub fn needs_printing(&self) -> bool {
        !matches!(self, Self::Reported(_))
    }
}
