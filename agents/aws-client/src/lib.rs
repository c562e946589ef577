//! AWS Request Plumbing
//!
//! Shared HTTP layer for the marketplace bootstrap agents: static, web
//! identity and temporary credentials, Signature Version 4 request signing, STS role
//! assumption, and an explicit retry policy wrapped around `reqwest`.
//!
//! ## Example
//!
//! ```ignore
//! use aws_client::{sts, RetryPolicy, SignedClient, SignedRequest, Signer};
//!
//! let http = aws_client::http_client()?;
//! let base = sts::base_credentials(&http, "eu-west-1", None).await?;
//! let temporary = sts::assume_role(&http, &base, "eu-west-1", &role_arn, sts::DEFAULT_SESSION_NAME, None).await?;
//!
//! let client = SignedClient::new(http, temporary, Signer::new("es", "eu-west-1").sign_content_sha256(), RetryPolicy::opensearch());
//! let response = client.send(SignedRequest::new(reqwest::Method::GET, url)).await?;
//! ```

pub mod client;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod retry;
pub mod sigv4;
pub mod sts;

pub use client::{http_client, ApiResponse, SignedClient, SignedRequest};
pub use credentials::Credentials;
pub use error::{Error, Result};
pub use logging::{init_tracing, LogFormat};
pub use retry::RetryPolicy;
pub use sigv4::Signer;
