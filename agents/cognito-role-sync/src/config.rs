//! Command line and environment configuration

use aws_client::LogFormat;
use clap::Parser;

use crate::error::{Result, SyncError};

/// Cognito Role Sync - route every identity provider to the authenticated role
#[derive(Parser, Debug)]
#[command(name = "cognito-role-sync", version, about)]
pub struct Cli {
    /// Identity pool id (e.g. eu-west-1:0c9a4e4e-...)
    #[arg(long, env = "COGNITO_IDENTITY_POOL_ID")]
    pub identity_pool_id: String,

    /// Role assumed by every authenticated identity
    #[arg(long, env = "COGNITO_IDENTITY_AUTHENTICATED_ARN")]
    pub authenticated_role_arn: String,

    /// Region of the identity pool (defaults to the pool id prefix)
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Region used when AWS_REGION is unset
    #[arg(long, env = "AWS_DEFAULT_REGION", hide = true)]
    pub default_region: Option<String>,

    /// Override the regional Cognito Identity endpoint
    #[arg(long, env = "COGNITO_IDENTITY_ENDPOINT")]
    pub endpoint: Option<String>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Read the pool but do not change its role mappings
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub identity_pool_id: String,
    pub authenticated_role_arn: String,
    pub region: String,
    pub endpoint: String,
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let region = [&cli.region, &cli.default_region]
            .into_iter()
            .flatten()
            .map(|r| r.trim())
            .find(|r| !r.is_empty())
            .map(str::to_string)
            .or_else(|| pool_region(&cli.identity_pool_id))
            .ok_or(SyncError::MissingRegion)?;

        let endpoint = cli
            .endpoint
            .clone()
            .unwrap_or_else(|| regional_endpoint(&region));

        Ok(Self {
            identity_pool_id: cli.identity_pool_id.clone(),
            authenticated_role_arn: cli.authenticated_role_arn.clone(),
            region,
            endpoint,
            dry_run: cli.dry_run,
        })
    }
}

/// Region prefix of an identity pool id (`{region}:{uuid}`)
pub fn pool_region(identity_pool_id: &str) -> Option<String> {
    identity_pool_id
        .split_once(':')
        .map(|(region, _)| region.trim())
        .filter(|region| !region.is_empty())
        .map(str::to_string)
}

pub fn regional_endpoint(region: &str) -> String {
    format!("https://cognito-identity.{}.amazonaws.com/", region)
}
