use thiserror::Error;

use tickcast_core::{PipelineError, SourceErrorKind, ValidationError};

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Pipeline(PipelineError::Validation(_)) => 2,
            Self::Pipeline(PipelineError::Source(error)) => match error.kind() {
                SourceErrorKind::InvalidRequest => 2,
                SourceErrorKind::Unavailable | SourceErrorKind::Internal => 3,
            },
            Self::Pipeline(PipelineError::Normalize(_) | PipelineError::Forecast(_)) => 4,
            Self::Serialization(_) => 5,
            Self::Io(_) => 10,
        }
    }
}
