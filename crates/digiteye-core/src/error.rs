use thiserror::Error;

#[derive(Debug, Error)]
pub enum DigitEyeError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid pixel grid: {0}")]
    InvalidGrid(String),

    #[error("Invalid label: {0} (expected a digit 0-9)")]
    InvalidLabel(u8),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, DigitEyeError>;
