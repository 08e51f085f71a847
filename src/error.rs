//! Error types for fetching and decoding post pages.
//!
//! Source implementations return [`Result<T>`]; the binary edge in `main.rs`
//! converts these into [`anyhow::Error`] for reporting.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Failed to decode response: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("API at {endpoint} did not advertise a master ref")]
    MissingMasterRef { endpoint: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
