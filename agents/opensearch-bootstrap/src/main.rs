//! OpenSearch Bootstrap - Standalone Binary
//!
//! ## Usage
//!
//! ```bash
//! # Provision a marketplace
//! MARKETPLACE_NAME=acme INDEX_ALIAS_SUFFIX=prod opensearch-bootstrap
//!
//! # Management template and master users
//! opensearch-bootstrap control
//!
//! # Print the requests without sending them
//! opensearch-bootstrap --dry-run
//! ```

use anyhow::{Context, Result};
use aws_client::init_tracing;
use clap::Parser;
use tracing::info;

use opensearch_bootstrap::{BootstrapConfig, Cli, OpenSearchClient, Provisioner};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = BootstrapConfig::from_cli(&cli).context("Invalid configuration")?;

    info!(
        mode = ?cli.mode,
        endpoint = %config.cluster.endpoint,
        dry_run = config.cluster.dry_run,
        "Starting OpenSearch bootstrap"
    );

    let client = if config.cluster.dry_run {
        OpenSearchClient::dry_run(&config.cluster.endpoint)
    } else {
        OpenSearchClient::connect(&config.cluster)
            .await
            .context("Failed to authenticate against the search cluster")?
    };

    Provisioner::new(client)
        .run(&config)
        .await
        .context("Provisioning aborted")?;

    info!("OpenSearch bootstrap complete");
    Ok(())
}
