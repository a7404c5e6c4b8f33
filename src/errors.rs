// Errors of the loading and output layer. The evaluation pipeline itself
// never fails; it skips what it cannot use.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MlatSafetyError>;

#[derive(Error, Debug)]
pub enum MlatSafetyError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    ConfigError(String),
}

pub fn config_error(msg: impl ToString) -> MlatSafetyError {
    MlatSafetyError::ConfigError(msg.to_string())
}
