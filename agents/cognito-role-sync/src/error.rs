//! Synchronizer errors

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("No region configured: set AWS_REGION or use a region-prefixed identity pool id")]
    MissingRegion,

    /// Signing or transport failure
    #[error(transparent)]
    Transport(#[from] aws_client::Error),

    /// Cognito Identity rejected a call
    #[error("{action} failed with {status}: {error_type}: {message}")]
    Api {
        action: String,
        status: StatusCode,
        error_type: String,
        message: String,
    },

    /// A successful response that does not match the API shape
    #[error("Unexpected {action} response: {source}")]
    Decode {
        action: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T, E = SyncError> = std::result::Result<T, E>;
