//! Configuration validation errors.

use super::error_code::TriageErrorCode;

/// Errors raised when engine construction rejects its configuration.
///
/// This is the only validation failure in the analysis core; every other
/// operation is total over its inputs.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("similarity threshold must be in (0, 1], got {value}")]
    InvalidSimilarityThreshold { value: f64 },
}

impl TriageErrorCode for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSimilarityThreshold { .. } => "CONFIG_INVALID_SIMILARITY_THRESHOLD",
        }
    }
}
