//! Identity Pool Role Synchronizer
//!
//! Points every identity provider configured on a pool at token-based role
//! resolution, falling back to the pool's authenticated role.

use tracing::info;

use crate::config::SyncConfig;
use crate::error::Result;
use crate::identity_pool::{IdentityPoolClient, SetIdentityPoolRolesRequest};

pub struct RoleSynchronizer {
    client: IdentityPoolClient,
}

impl RoleSynchronizer {
    pub fn new(client: IdentityPoolClient) -> Self {
        Self { client }
    }

    /// Map each provider of the pool; returns the mapping keys in provider order.
    ///
    /// Each provider gets its own `SetIdentityPoolRoles` call. Any error from
    /// Cognito stops the run.
    pub async fn run(&self, config: &SyncConfig) -> Result<Vec<String>> {
        let pool = self
            .client
            .describe_identity_pool(&config.identity_pool_id)
            .await?;

        info!(
            identity_pool = %pool.identity_pool_id,
            name = pool.identity_pool_name.as_deref().unwrap_or("-"),
            providers = pool.cognito_identity_providers.len(),
            "Found identity providers"
        );

        let mut keys = Vec::with_capacity(pool.cognito_identity_providers.len());
        for provider in &pool.cognito_identity_providers {
            let key = provider.mapping_key();
            info!("Set up auth provider {}", key);

            if config.dry_run {
                info!(provider = %key, "DRY RUN - role mapping not changed");
            } else {
                let request = SetIdentityPoolRolesRequest::authenticated_token_mapping(
                    &config.identity_pool_id,
                    &config.authenticated_role_arn,
                    &key,
                );
                self.client.set_identity_pool_roles(&request).await?;
            }

            keys.push(key);
        }

        Ok(keys)
    }
}
