//! Command line and environment configuration
//!
//! Every setting can be given as a flag or through its environment variable.
//! [`BootstrapConfig`] is built once in `main` and borrowed by every step.

use aws_client::LogFormat;
use clap::{Parser, ValueEnum};

use crate::error::ConfigError;

/// What a run provisions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Tenant, permissions and data stream for one marketplace
    #[default]
    Marketplace,
    /// Management index template and master-user role mappings
    Control,
}

/// OpenSearch Bootstrap - provision marketplace access control
#[derive(Parser, Debug)]
#[command(name = "opensearch-bootstrap", version, about)]
pub struct Cli {
    /// Provisioning mode
    #[arg(value_enum, default_value_t = Mode::Marketplace)]
    pub mode: Mode,

    /// Domain endpoint including scheme (e.g. https://search-logs.eu-west-1.es.amazonaws.com)
    #[arg(long, env = "OPENSEARCH_ENDPOINT")]
    pub opensearch_endpoint: String,

    /// Region used for request signing
    #[arg(long, env = "OPENSEARCH_REGION")]
    pub opensearch_region: String,

    /// Role assumed for every call; also a master user in control mode
    #[arg(long, env = "ASSUME_ROLE_ARN")]
    pub assume_role_arn: String,

    /// Cognito authenticated role, granted master access in control mode
    #[arg(long, env = "COGNITO_ROLE_ARN")]
    pub cognito_role_arn: Option<String>,

    /// Marketplace (tenant) name
    #[arg(long, env = "MARKETPLACE_NAME", default_value = "")]
    pub marketplace_name: String,

    /// Suffix of the marketplace data stream alias (`{marketplace}-{suffix}`)
    #[arg(long, env = "INDEX_ALIAS_SUFFIX")]
    pub index_alias_suffix: Option<String>,

    /// Alias of the management data stream
    #[arg(long, env = "INDEX_ALIAS_MGMT")]
    pub index_alias_mgmt: Option<String>,

    /// Internal users mapped to the agent role (comma-separated)
    #[arg(long, env = "USERS_AGENT", default_value = "")]
    pub users_agent: String,

    /// Backend roles mapped to the dashboard role (comma-separated)
    #[arg(long, env = "USERS_DASHBOARD", default_value = "")]
    pub users_dashboard: String,

    #[arg(long, env = "NUMBER_OF_SHARDS")]
    pub number_of_shards: u32,

    #[arg(long, env = "NUMBER_OF_REPLICAS")]
    pub number_of_replicas: u32,

    /// Override the regional STS endpoint
    #[arg(long, env = "STS_ENDPOINT")]
    pub sts_endpoint: Option<String>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Log every request instead of sending it
    #[arg(long, default_value = "false")]
    pub dry_run: bool,
}

/// Connection settings for the search cluster
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    pub endpoint: String,
    pub region: String,
    pub assume_role_arn: String,
    pub sts_endpoint: Option<String>,
    pub dry_run: bool,
}

/// Shard layout applied to every index template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizing {
    pub shards: u32,
    pub replicas: u32,
}

/// Resource names derived from a marketplace name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplaceNames {
    pub marketplace: String,
    pub tenant: String,
    pub index_template: String,
    pub index_alias: String,
    pub group_agent: String,
    pub group_dashboard: String,
    pub role_agent: String,
    pub role_dashboard: String,
}

impl MarketplaceNames {
    pub fn new(marketplace: &str, alias_suffix: &str) -> Self {
        Self {
            marketplace: marketplace.to_string(),
            tenant: marketplace.to_string(),
            index_template: marketplace.to_string(),
            index_alias: format!("{}-{}", marketplace, alias_suffix),
            group_agent: format!("{}-group-agent", marketplace),
            group_dashboard: format!("{}-group-dashboard", marketplace),
            role_agent: format!("{}-role-agent", marketplace),
            role_dashboard: format!("{}-role-dashboard", marketplace),
        }
    }

    /// Pattern of the data stream's backing indices
    pub fn backing_index_pattern(&self) -> String {
        backing_index_pattern(&self.index_alias)
    }
}

/// `.ds-{alias}-*`
pub fn backing_index_pattern(alias: &str) -> String {
    format!(".ds-{}-*", alias)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketplacePlan {
    pub names: MarketplaceNames,
    pub index_alias_mgmt: String,
    pub users_agent: Vec<String>,
    pub users_dashboard: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPlan {
    pub index_alias_mgmt: String,
    /// Principals granted `all_access` and `security_manager`
    pub master_users: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    Marketplace(MarketplacePlan),
    Control(ControlPlan),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapConfig {
    pub cluster: ClusterConfig,
    pub sizing: Sizing,
    pub plan: Plan,
}

impl BootstrapConfig {
    /// Validate the mode-specific settings and derive all names
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let cluster = ClusterConfig {
            endpoint: cli.opensearch_endpoint.trim_end_matches('/').to_string(),
            region: cli.opensearch_region.clone(),
            assume_role_arn: cli.assume_role_arn.clone(),
            sts_endpoint: cli.sts_endpoint.clone(),
            dry_run: cli.dry_run,
        };
        let sizing = Sizing {
            shards: cli.number_of_shards,
            replicas: cli.number_of_replicas,
        };

        let index_alias_mgmt =
            required(&cli.index_alias_mgmt, "INDEX_ALIAS_MGMT")?.to_string();

        let plan = match cli.mode {
            Mode::Control => {
                let cognito_role_arn = required(&cli.cognito_role_arn, "COGNITO_ROLE_ARN")?;
                Plan::Control(ControlPlan {
                    index_alias_mgmt,
                    master_users: vec![cli.assume_role_arn.clone(), cognito_role_arn.to_string()],
                })
            }
            Mode::Marketplace => {
                let marketplace = cli.marketplace_name.trim();
                if marketplace.is_empty() {
                    return Err(ConfigError::Missing("MARKETPLACE_NAME"));
                }
                let suffix = required(&cli.index_alias_suffix, "INDEX_ALIAS_SUFFIX")?;
                Plan::Marketplace(MarketplacePlan {
                    names: MarketplaceNames::new(marketplace, suffix),
                    index_alias_mgmt,
                    users_agent: split_list(&cli.users_agent),
                    users_dashboard: split_list(&cli.users_dashboard),
                })
            }
        };

        Ok(Self {
            cluster,
            sizing,
            plan,
        })
    }
}

fn required<'a>(value: &'a Option<String>, var: &'static str) -> Result<&'a str, ConfigError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(var))
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}
