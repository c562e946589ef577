//! Provisioning errors

use reqwest::StatusCode;
use thiserror::Error;

/// Invalid or incomplete configuration, detected before any remote call
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
}

#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Signing, STS, transport or retry budget failure
    #[error(transparent)]
    Transport(#[from] aws_client::Error),

    /// The cluster rejected a provisioning call
    #[error("{operation} failed with {status}: {body}")]
    Status {
        operation: String,
        status: StatusCode,
        body: String,
    },
}

pub type Result<T, E = ProvisionError> = std::result::Result<T, E>;
