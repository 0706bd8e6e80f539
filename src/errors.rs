use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File size exceeds the maximum allowed size for this guild. Maximum is {0}MB")]
    SizeExceeded(u64),

    #[error("{0} canceled as it took too long")]
    Timeout(String),

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Delivery error: {0}")]
    Delivery(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

pub type Result<T> = std::result::Result<T, AppError>;
