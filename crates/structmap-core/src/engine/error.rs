use super::config::ConfigError;
use crate::core::sequence::alignment::AlignmentError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unknown aggregation method: '{0}'")]
    UnknownMethod(String),

    #[error("Method '{method}' requires '{argument}', which was not supplied")]
    MissingReference {
        argument: &'static str,
        method: String,
    },

    #[error("Invalid value for '{argument}': {reason}")]
    InvalidInput {
        argument: &'static str,
        reason: String,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Alignment error: {0}")]
    Alignment(#[from] AlignmentError),

    #[error("Aggregation '{method}' failed at residue {residue}: {reason}")]
    Aggregation {
        method: String,
        residue: isize,
        reason: String,
    },
}
