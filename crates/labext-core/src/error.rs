/// Errors that can occur in the extension manager model.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Uninstall requested for an extension that is not installed.
    #[error("Not installed, cannot uninstall: {0}")]
    NotInstalled(String),

    /// Enable requested for an extension that is already enabled.
    #[error("Already enabled: {0}")]
    AlreadyEnabled(String),

    /// Disable requested for an extension that is already disabled.
    #[error("Already disabled: {0}")]
    AlreadyDisabled(String),

    /// Install requested for an extension on the server's block list.
    #[error("extension '{name}' is blocked: {reason}")]
    Blocked { name: String, reason: String },

    /// Install requested for an extension missing from the server's allow list.
    #[error("extension '{0}' is not on the allow list")]
    NotAllowed(String),

    /// Non-2xx response or network failure, carrying `"<status> (<statusText>)"`
    /// or the underlying transport message.
    #[error("{0}")]
    Transport(String),

    /// Response body did not match the expected shape.
    #[error("invalid {what}: {reason}")]
    Schema { what: String, reason: String },

    /// Invalid semver version string.
    #[error("invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        source: semver::Error,
    },

    /// A companion rule carried a pattern that is not a valid regular expression.
    #[error("invalid kernel pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: regex::Error,
    },

    /// Companion rules reference kernels but no kernel specs are available.
    #[error("No kernelspecs found")]
    NoKernelSpecs,

    /// Any other collaborator failure.
    #[error("{0}")]
    Backend(String),
}

impl Error {
    /// Build a schema error for the named document.
    pub fn schema(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Schema {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the transport layer rather than from
    /// interpreting a response body.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether this error is a local precondition failure raised before any
    /// request was made.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::NotInstalled(_)
                | Self::AlreadyEnabled(_)
                | Self::AlreadyDisabled(_)
                | Self::Blocked { .. }
                | Self::NotAllowed(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
