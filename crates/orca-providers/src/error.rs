//! Error types for orca-providers

pub type Result<T> = std::result::Result<T, Error>;

/// Broad classification of a resolution failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or missing user configuration
    Configuration,
    /// The caller referenced something the project does not declare
    Parameter,
    /// A plugin failed or could not reach a ready state
    Plugin,
    /// The resolution driver itself failed
    Internal,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] orca_config::Error),

    #[error("{message}")]
    Plugin { provider: String, message: String },

    #[error("Resolution of provider '{provider}' did not complete: {message}")]
    Join { provider: String, message: String },

    /// Failure of a resolution attempt another task was already running
    #[error("{message}")]
    Failed {
        provider: String,
        kind: ErrorKind,
        message: String,
    },
}

impl Error {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Config(orca_config::Error::configuration(message))
    }

    pub fn plugin(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Copy of this error handed to tasks that waited on the failed attempt.
    pub fn shared(&self, provider: impl Into<String>) -> Self {
        Self::Failed {
            provider: provider.into(),
            kind: self.kind(),
            message: self.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(orca_config::Error::Parameter { .. }) => ErrorKind::Parameter,
            Self::Config(_) => ErrorKind::Configuration,
            Self::Plugin { .. } => ErrorKind::Plugin,
            Self::Join { .. } => ErrorKind::Internal,
            Self::Failed { kind, .. } => *kind,
        }
    }
}
