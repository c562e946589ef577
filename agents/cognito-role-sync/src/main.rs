//! Cognito Role Sync - Standalone Binary
//!
//! ## Usage
//!
//! ```bash
//! COGNITO_IDENTITY_POOL_ID=eu-west-1:0c9a... \
//! COGNITO_IDENTITY_AUTHENTICATED_ARN=arn:aws:iam::123456789012:role/opensearch-auth \
//! cognito-role-sync
//! ```

use anyhow::{Context, Result};
use aws_client::init_tracing;
use clap::Parser;
use tracing::info;

use cognito_role_sync::{Cli, IdentityPoolClient, RoleSynchronizer, SyncConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = SyncConfig::from_cli(&cli).context("Invalid configuration")?;

    info!(
        identity_pool = %config.identity_pool_id,
        region = %config.region,
        dry_run = config.dry_run,
        "Starting Cognito role sync"
    );

    let client = IdentityPoolClient::connect(&config)
        .await
        .context("Failed to create Cognito Identity client")?;

    let keys = RoleSynchronizer::new(client)
        .run(&config)
        .await
        .context("Role sync aborted")?;

    info!(providers = keys.len(), "Cognito role sync complete");
    Ok(())
}
