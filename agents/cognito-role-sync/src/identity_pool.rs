//! Cognito Identity API Client
//!
//! Minimal client for the two identity pool calls the synchronizer needs,
//! speaking the AWS JSON 1.1 protocol over signed requests.

use std::collections::BTreeMap;

use aws_client::client::parse_url;
use aws_client::{
    http_client, sts, ApiResponse, RetryPolicy, SignedClient, SignedRequest, Signer,
};
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::SyncConfig;
use crate::error::{Result, SyncError};

const SERVICE: &str = "cognito-identity";
const TARGET_PREFIX: &str = "AWSCognitoIdentityService";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

// ============================================================
// API Types
// ============================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct IdentityPool {
    pub identity_pool_id: String,
    #[serde(default)]
    pub identity_pool_name: Option<String>,
    #[serde(default)]
    pub cognito_identity_providers: Vec<CognitoIdentityProvider>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CognitoIdentityProvider {
    pub provider_name: String,
    pub client_id: String,
}

impl CognitoIdentityProvider {
    /// Role mapping key, `{provider_name}:{client_id}`
    pub fn mapping_key(&self) -> String {
        format!("{}:{}", self.provider_name, self.client_id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RoleMappingType {
    Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AmbiguousRoleResolution {
    AuthenticatedRole,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleMapping {
    #[serde(rename = "Type")]
    pub mapping_type: RoleMappingType,
    pub ambiguous_role_resolution: AmbiguousRoleResolution,
}

impl RoleMapping {
    /// Roles come from the token; unresolvable tokens get the authenticated role
    pub fn token_with_authenticated_fallback() -> Self {
        Self {
            mapping_type: RoleMappingType::Token,
            ambiguous_role_resolution: AmbiguousRoleResolution::AuthenticatedRole,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct DescribeIdentityPoolRequest<'a> {
    identity_pool_id: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct SetIdentityPoolRolesRequest {
    pub identity_pool_id: String,
    pub roles: BTreeMap<String, String>,
    pub role_mappings: BTreeMap<String, RoleMapping>,
}

impl SetIdentityPoolRolesRequest {
    /// Bind `authenticated_role_arn` and map one provider key by token
    pub fn authenticated_token_mapping(
        identity_pool_id: &str,
        authenticated_role_arn: &str,
        mapping_key: &str,
    ) -> Self {
        Self {
            identity_pool_id: identity_pool_id.to_string(),
            roles: BTreeMap::from([(
                "authenticated".to_string(),
                authenticated_role_arn.to_string(),
            )]),
            role_mappings: BTreeMap::from([(
                mapping_key.to_string(),
                RoleMapping::token_with_authenticated_fallback(),
            )]),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(rename = "__type", default)]
    error_type: String,
    #[serde(alias = "Message", default)]
    message: String,
}

// ============================================================
// Client Implementation
// ============================================================

pub struct IdentityPoolClient {
    client: SignedClient,
    endpoint: Url,
}

impl IdentityPoolClient {
    pub fn new(endpoint: &str, client: SignedClient) -> Result<Self> {
        Ok(Self {
            client,
            endpoint: parse_url(endpoint)?,
        })
    }

    /// Client signed with the environment's credentials; calls are not retried
    pub async fn connect(config: &SyncConfig) -> Result<Self> {
        let http = http_client()?;
        let credentials = sts::base_credentials(&http, &config.region, None).await?;
        let signed = SignedClient::new(
            http,
            credentials,
            Signer::new(SERVICE, &config.region),
            RetryPolicy::none(),
        );
        Self::new(&config.endpoint, signed)
    }

    pub async fn describe_identity_pool(&self, identity_pool_id: &str) -> Result<IdentityPool> {
        let action = "DescribeIdentityPool";
        let response = self
            .call(action, &DescribeIdentityPoolRequest { identity_pool_id })
            .await?;
        decode(action, &response)
    }

    pub async fn set_identity_pool_roles(&self, request: &SetIdentityPoolRolesRequest) -> Result<()> {
        self.call("SetIdentityPoolRoles", request).await?;
        Ok(())
    }

    async fn call<T: Serialize>(&self, action: &str, body: &T) -> Result<ApiResponse> {
        let payload = serde_json::to_vec(body).map_err(aws_client::Error::from)?;
        let request = SignedRequest::new(Method::POST, self.endpoint.clone())
            .header("x-amz-target", format!("{}.{}", TARGET_PREFIX, action))
            .body(CONTENT_TYPE, payload);

        let response = self.client.send(request).await?;
        debug!(action = %action, status = %response.status, "Cognito Identity response");

        if !response.is_success() {
            let error: ApiErrorBody =
                serde_json::from_str(&response.body).unwrap_or(ApiErrorBody {
                    error_type: String::new(),
                    message: response.body.clone(),
                });
            return Err(SyncError::Api {
                action: action.to_string(),
                status: response.status,
                error_type: short_error_type(&error.error_type).to_string(),
                message: error.message,
            });
        }

        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(action: &str, response: &ApiResponse) -> Result<T> {
    serde_json::from_str(&response.body).map_err(|source| SyncError::Decode {
        action: action.to_string(),
        source,
    })
}

/// `com.amazonaws.cognito.identity#ResourceNotFoundException` -> `ResourceNotFoundException`
fn short_error_type(error_type: &str) -> &str {
    error_type.rsplit('#').next().unwrap_or(error_type)
}
