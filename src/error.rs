use polars::error::PolarsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TahmoError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("API request failed ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Unexpected response structure: {0}")]
    PartialResponse(String),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("Failed to parse JSON data")]
    JsonParse(#[from] serde_json::Error),

    #[error("Zero or multiple sensors matched code '{code}' ({matches} matches)")]
    SensorLookup { code: String, matches: usize },

    #[error("Environment variable {0} is not set")]
    MissingCredentials(&'static str),

    #[error("Failed processing DataFrame: {0}")]
    DataFrameProcessing(#[from] PolarsError),
}
