//! Error types for orca-config

/// Result type for orca-config operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving project and environment configuration
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed or missing user input: bad selector syntax, missing
    /// varfile, namespacing violation, schema or template failure.
    #[error("{message}")]
    Configuration { message: String },

    /// The caller asked for something the project does not declare.
    #[error("{message}")]
    Parameter { message: String },

    /// Filesystem error from orca-fs
    #[error(transparent)]
    Fs(#[from] orca_fs::Error),
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn parameter(message: impl Into<String>) -> Self {
        Self::Parameter {
            message: message.into(),
        }
    }
}
