//! Errors raised by the signing and transport layer

use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Neither static keys nor a web identity are configured
    #[error("AWS credentials not configured: {0} is missing")]
    MissingCredentials(&'static str),

    /// A request URL could not be built
    #[error("Invalid request URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    /// Request body could not be serialized
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Transport-level failure (DNS, TLS, connection reset, ...)
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Every attempt ended in a retryable status
    #[error("Gave up after {attempts} attempts, last response was {status}")]
    RetriesExhausted { attempts: u32, status: StatusCode },

    /// The web identity token file named by the environment is unreadable
    #[error("Failed to read web identity token from {path}: {source}")]
    WebIdentityToken {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// STS refused the role assumption
    #[error("AWS STS failed with {status}: {body}")]
    Sts { status: StatusCode, body: String },

    /// STS answered with something that is not an AssumeRole document
    #[error("Failed to parse AWS STS XML response: {0}")]
    StsResponse(#[from] quick_xml::DeError),
}
