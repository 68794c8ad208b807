use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid response from {backend}: {details}")]
    BackendResponse { backend: String, details: String },

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("serialize error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("graphql errors: {}", .0.join("; "))]
    GraphQl(Vec<String>),

    #[error("search request failed: {0}")]
    Request(String),

    #[error("search request timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Error)]
pub enum ParamError {
    #[error("regex error: {0}")]
    Regex(#[from] regex::Error),

    #[error("invalid range for `{key}`: {value}")]
    InvalidRange { key: String, value: String },

    #[error("invalid number for `{key}`: {value}")]
    InvalidNumber { key: String, value: String },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

pub type Result<T, E = SearchError> = std::result::Result<T, E>;
