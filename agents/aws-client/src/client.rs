//! Signed HTTP client
//!
//! Every attempt is signed afresh (the signature embeds the request time)
//! and dispatched under the client's [`RetryPolicy`].

use std::time::Duration;

use chrono::Utc;
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::sigv4::Signer;

const USER_AGENT: &str = concat!("marketplace-bootstrap/", env!("CARGO_PKG_VERSION"));

/// Build the shared `reqwest` client
pub fn http_client() -> Result<Client> {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .map_err(Error::Http)
}

/// Parse a URL, keeping the offending input in the error
pub fn parse_url(raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|source| Error::InvalidUrl {
        url: raw.to_string(),
        source,
    })
}

/// A request before signing
#[derive(Debug, Clone)]
pub struct SignedRequest {
    method: Method,
    url: Url,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl SignedRequest {
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Raw body with its content type
    pub fn body(mut self, content_type: &str, body: Vec<u8>) -> Self {
        self.headers
            .push(("content-type".to_string(), content_type.to_string()));
        self.body = body;
        self
    }

    /// Serialize `body` as the JSON payload
    pub fn json<T: Serialize + ?Sized>(self, body: &T) -> Result<Self> {
        let bytes = serde_json::to_vec(body)?;
        Ok(self.body("application/json", bytes))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn payload(&self) -> &[u8] {
        &self.body
    }
}

/// Status and body of a completed call
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Body as JSON, or as a JSON string when it is not valid JSON
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|_| serde_json::Value::String(self.body.clone()))
    }
}

/// HTTP client that signs with SigV4 and retries per policy
pub struct SignedClient {
    http: Client,
    credentials: Credentials,
    signer: Signer,
    retry: RetryPolicy,
}

impl SignedClient {
    pub fn new(http: Client, credentials: Credentials, signer: Signer, retry: RetryPolicy) -> Self {
        Self {
            http,
            credentials,
            signer,
            retry,
        }
    }

    /// Send a request and read the whole response body
    pub async fn send(&self, request: SignedRequest) -> Result<ApiResponse> {
        let operation = format!("{} {}", request.method, request.url.path());
        let client = self;
        let request = &request;

        let response = self
            .retry
            .execute(&request.method, &operation, || client.dispatch(request))
            .await?;

        let status = response.status();
        let body = response.text().await?;
        debug!(operation = %operation, status = %status, "Response received");

        Ok(ApiResponse { status, body })
    }

    async fn dispatch(&self, request: &SignedRequest) -> Result<reqwest::Response, reqwest::Error> {
        let auth_headers = self.signer.sign(
            &self.credentials,
            request.method.as_str(),
            &request.url,
            &request.headers,
            &request.body,
            Utc::now(),
        );

        let mut builder = self
            .http
            .request(request.method.clone(), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        for (name, value) in auth_headers {
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        builder.send().await
    }
}
