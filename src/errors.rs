use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteError {
    #[error("Ticker symbol is empty")]
    EmptySymbol,

    // Built with `without_url()` so the API key in the query never leaks.
    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("HTTP status error: {0}")]
    StatusError(reqwest::StatusCode),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

pub type Result<T> = std::result::Result<T, QuoteError>;
