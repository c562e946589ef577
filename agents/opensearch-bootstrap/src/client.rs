//! OpenSearch and Dashboards HTTP access
//!
//! Live clients sign every call for the `es` service with credentials of
//! the assumed role. Dry-run clients only log what would be sent.

use aws_client::client::parse_url;
use aws_client::{
    http_client, sts, ApiResponse, RetryPolicy, SignedClient, SignedRequest, Signer,
};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::{debug, info};

use crate::config::ClusterConfig;
use crate::error::Result;

const DASHBOARDS_PREFIX: &str = "_dashboards";

enum Transport {
    Live(SignedClient),
    DryRun,
}

pub struct OpenSearchClient {
    endpoint: String,
    dashboards_endpoint: String,
    transport: Transport,
}

impl OpenSearchClient {
    pub fn new(endpoint: &str, signed: SignedClient) -> Self {
        Self::with_transport(endpoint, Transport::Live(signed))
    }

    /// Client that never touches the network
    pub fn dry_run(endpoint: &str) -> Self {
        Self::with_transport(endpoint, Transport::DryRun)
    }

    fn with_transport(endpoint: &str, transport: Transport) -> Self {
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let dashboards_endpoint = format!("{}/{}", endpoint, DASHBOARDS_PREFIX);
        Self {
            endpoint,
            dashboards_endpoint,
            transport,
        }
    }

    /// Assume the configured role and build a live client
    pub async fn connect(cluster: &ClusterConfig) -> Result<Self> {
        let http = http_client()?;
        let base = sts::base_credentials(
            &http,
            &cluster.region,
            cluster.sts_endpoint.as_deref(),
        )
        .await?;

        let credentials = sts::assume_role(
            &http,
            &base,
            &cluster.region,
            &cluster.assume_role_arn,
            sts::DEFAULT_SESSION_NAME,
            cluster.sts_endpoint.as_deref(),
        )
        .await?;

        let signer = Signer::new("es", &cluster.region).sign_content_sha256();
        let signed = SignedClient::new(http, credentials, signer, RetryPolicy::opensearch());

        info!(endpoint = %cluster.endpoint, "Connected to search cluster");
        Ok(Self::new(&cluster.endpoint, signed))
    }

    pub async fn get(&self, path: &str) -> Result<ApiResponse> {
        let url = parse_url(&format!("{}/{}", self.endpoint, path))?;
        self.send(SignedRequest::new(Method::GET, url)).await
    }

    pub async fn put<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let url = parse_url(&format!("{}/{}", self.endpoint, path))?;
        self.send(SignedRequest::new(Method::PUT, url).json(body)?)
            .await
    }

    pub async fn patch<T: Serialize + ?Sized>(&self, path: &str, body: &T) -> Result<ApiResponse> {
        let url = parse_url(&format!("{}/{}", self.endpoint, path))?;
        self.send(SignedRequest::new(Method::PATCH, url).json(body)?)
            .await
    }

    /// POST to the Dashboards API inside `tenant`
    pub async fn dashboards_post<T: Serialize + ?Sized>(
        &self,
        path: &str,
        tenant: &str,
        body: &T,
    ) -> Result<ApiResponse> {
        let url = parse_url(&format!("{}/{}", self.dashboards_endpoint, path))?;
        let request = SignedRequest::new(Method::POST, url)
            .header("osd-xsrf", "true")
            .header("security_tenant", tenant)
            .json(body)?;
        self.send(request).await
    }

    async fn send(&self, request: SignedRequest) -> Result<ApiResponse> {
        match &self.transport {
            Transport::Live(client) => {
                debug!(method = %request.method(), url = %request.url(), "Sending request");
                Ok(client.send(request).await?)
            }
            Transport::DryRun => {
                info!(
                    method = %request.method(),
                    url = %request.url(),
                    body = %String::from_utf8_lossy(request.payload()),
                    "DRY RUN - request not sent"
                );
                Ok(ApiResponse::new(StatusCode::OK, "{}"))
            }
        }
    }
}
