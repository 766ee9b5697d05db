use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid scope pattern: {0}")]
    PatternError(#[from] regex::Error),

    #[error("Unparseable response status: {0:?}")]
    InvalidStatusLine(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Report serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Task join error: {0}")]
    JoinError(#[from] tokio::task::JoinError),

    #[error("Other error: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ScanError>;
