use chrono::NaiveDateTime;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Environment variable {0} with the MOENV API key is not set")]
    MissingApiKey(&'static str),

    #[error("Failed to build request for {0}")]
    RequestBuild(String, #[source] reqwest::Error),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to decode JSON response from {0}")]
    JsonDecode(String, #[source] reqwest::Error),

    #[error("Record {index} has an invalid '{field}' value '{value}'")]
    InvalidRecord {
        index: usize,
        field: String,
        value: String,
    },

    #[error("End time {end} must be after start time {start}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    #[error("No records available from the API")]
    NoData,
}
