//! OpenSearch Marketplace Bootstrap
//!
//! Idempotently provisions one marketplace (tenant) on an Amazon OpenSearch
//! Service domain: data stream template, security tenant, action groups,
//! Dashboards index pattern, roles and role mappings. A separate control
//! mode installs the management template and grants master access to the
//! provisioning and Cognito roles.
//!
//! ```ignore
//! let config = BootstrapConfig::from_cli(&Cli::parse())?;
//! let client = OpenSearchClient::connect(&config.cluster).await?;
//! Provisioner::new(client).run(&config).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod payloads;
pub mod policy;
pub mod provisioner;

pub use client::OpenSearchClient;
pub use config::{BootstrapConfig, Cli, MarketplaceNames, Mode, Plan};
pub use error::{ConfigError, ProvisionError};
pub use provisioner::Provisioner;
