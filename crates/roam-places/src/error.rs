//! Places-specific error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlacesError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limited")]
    RateLimited,

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}
