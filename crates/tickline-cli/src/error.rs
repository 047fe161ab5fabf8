use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] tickline_core::ValidationError),

    #[error(transparent)]
    Load(#[from] tickline_core::LoadError),

    #[error("{message} ({code})")]
    Seed { code: String, message: String },

    #[error("session error: {0}")]
    Session(#[from] tickline_core::SessionClosed),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<tickline_core::CoreError> for CliError {
    fn from(error: tickline_core::CoreError) -> Self {
        match error {
            tickline_core::CoreError::Validation(error) => Self::Validation(error),
            tickline_core::CoreError::Load(error) => Self::Load(error),
            tickline_core::CoreError::Serialization(error) => Self::Serialization(error),
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Load(_) | Self::Seed { .. } => 3,
            Self::Serialization(_) => 4,
            Self::Session(_) => 6,
            Self::Logging(_) => 7,
            Self::Io(_) => 10,
        }
    }
}
