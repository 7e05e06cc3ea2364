//! Feature-server error types.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single feature-server request.
///
/// Each variant is recoverable at some scope; callers decide whether to
/// abort, skip or fall back.
#[derive(Debug, Error)]
pub enum FeatureServerError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP Error {status} from {url}")]
    HttpStatus { status: StatusCode, url: String },
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Server error {code}: {message}")]
    Remote { code: i64, message: String },
    #[error("Response is missing the '{0}' field")]
    MissingField(&'static str),
    #[error("Layer does not support ID querying")]
    IdQueryUnsupported,
}

impl FeatureServerError {
    /// Whether the server answered with a non-success status code.
    pub fn is_status(&self) -> bool {
        matches!(self, FeatureServerError::HttpStatus { .. })
    }
}
