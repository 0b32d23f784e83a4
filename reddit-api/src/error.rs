use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedditApiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("post not found")]
    NotFound,

    #[error("Reddit rejected the request: {0}")]
    Api(String),

    #[error("unsupported media file: {0}")]
    UnsupportedMedia(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for RedditApiError {
    fn from(err: config::ConfigError) -> Self {
        RedditApiError::Configuration(err.to_string())
    }
}
