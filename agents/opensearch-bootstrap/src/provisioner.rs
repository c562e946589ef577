//! Marketplace Provisioner
//!
//! Issues the create-or-update calls in a fixed order. The first rejected
//! call aborts the run; calls already applied are left in place.

use aws_client::ApiResponse;
use reqwest::StatusCode;
use tracing::{error, info};

use crate::client::OpenSearchClient;
use crate::config::{BootstrapConfig, ControlPlan, MarketplacePlan, Plan, Sizing};
use crate::error::{ProvisionError, Result};
use crate::payloads::{ActionGroup, IndexPattern, IndexTemplate, PatchOperation, Role, RoleMapping, Tenant};
use crate::policy;

const SECURITY_API: &str = "_plugins/_security/api";

pub struct Provisioner {
    client: OpenSearchClient,
}

impl Provisioner {
    pub fn new(client: OpenSearchClient) -> Self {
        Self { client }
    }

    /// Run the plan selected by the configuration
    pub async fn run(&self, config: &BootstrapConfig) -> Result<()> {
        match &config.plan {
            Plan::Control(plan) => self.run_control(plan, &config.sizing).await,
            Plan::Marketplace(plan) => self.run_marketplace(plan, &config.sizing).await,
        }
    }

    /// Management template, then master-user mappings
    pub async fn run_control(&self, plan: &ControlPlan, sizing: &Sizing) -> Result<()> {
        info!(index_alias = %plan.index_alias_mgmt, "Provisioning control resources");

        let template = policy::control_template(&plan.index_alias_mgmt, sizing);
        self.create_index_template(policy::CONTROL_TEMPLATE_NAME, &template)
            .await?;
        self.update_master_users_mapping(&plan.master_users).await
    }

    /// Template, tenant, action groups, index pattern, roles, role mappings
    pub async fn run_marketplace(&self, plan: &MarketplacePlan, sizing: &Sizing) -> Result<()> {
        let names = &plan.names;
        info!(marketplace = %names.marketplace, index_alias = %names.index_alias, "Provisioning marketplace");

        let template = policy::marketplace_template(names, sizing);
        self.create_index_template(&names.index_template, &template)
            .await?;
        self.create_marketplace_tenant(&names.tenant).await?;
        self.create_actiongroups(&policy::action_groups(names))
            .await?;
        self.create_index_pattern(&names.index_alias, &names.tenant)
            .await?;
        self.create_roles(&policy::roles(names, &plan.index_alias_mgmt))
            .await?;
        self.mapping_role_to_user(&policy::role_mappings(plan))
            .await?;

        info!(marketplace = %names.marketplace, "Marketplace provisioned");
        Ok(())
    }

    pub async fn create_index_template(&self, name: &str, template: &IndexTemplate) -> Result<()> {
        let response = self
            .client
            .put(&format!("_index_template/{}", name), template)
            .await?;
        check_response(&format!("Index template '{}' creation:", name), response)?;
        Ok(())
    }

    pub async fn create_marketplace_tenant(&self, name: &str) -> Result<()> {
        let response = self
            .client
            .put(&format!("{}/tenants/{}", SECURITY_API, name), &Tenant::private(name))
            .await?;
        check_response("Tenant creation:", response)?;
        Ok(())
    }

    pub async fn create_actiongroups(&self, groups: &[ActionGroup]) -> Result<()> {
        for group in groups {
            let response = self
                .client
                .put(&format!("{}/actiongroups/{}", SECURITY_API, group.name), group)
                .await?;
            check_response("Action group creation:", response)?;
        }
        Ok(())
    }

    /// Dashboards index pattern for `name` inside `tenant`; an existing
    /// pattern (409) counts as success
    pub async fn create_index_pattern(&self, name: &str, tenant: &str) -> Result<()> {
        let response = self
            .client
            .dashboards_post(
                &format!("api/saved_objects/index-pattern/{}", name),
                tenant,
                &IndexPattern::new(name, policy::TIME_FIELD),
            )
            .await?;

        if response.status == StatusCode::CONFLICT {
            info!(index_pattern = %name, "Index pattern already exists");
            return Ok(());
        }
        check_response("Index pattern creation:", response)?;
        Ok(())
    }

    pub async fn create_roles(&self, roles: &[Role]) -> Result<()> {
        for role in roles {
            let response = self
                .client
                .put(&format!("{}/roles/{}", SECURITY_API, role.name), role)
                .await?;
            check_response("Role creation:", response)?;
        }
        Ok(())
    }

    pub async fn mapping_role_to_user(&self, mappings: &[RoleMapping]) -> Result<()> {
        for mapping in mappings {
            let response = self
                .client
                .put(&format!("{}/rolesmapping/{}", SECURITY_API, mapping.role), mapping)
                .await?;
            check_response("Role mapping creation:", response)?;
        }
        Ok(())
    }

    /// Replace the backend roles of every master role with `users`, then
    /// read each mapping back for the log
    pub async fn update_master_users_mapping(&self, users: &[String]) -> Result<()> {
        let patch = vec![PatchOperation::replace("/backend_roles", users.to_vec())];

        for role in policy::MASTER_ROLES {
            let path = format!("{}/rolesmapping/{}", SECURITY_API, role);

            let response = self.client.patch(&path, &patch).await?;
            check_response("Role mapping patch:", response)?;

            let response = self.client.get(&path).await?;
            let mapping = check_response("Mapping:", response)?;
            info!(role = %role, mapping = %mapping, "Master role mapping");
        }
        Ok(())
    }
}

/// Accept 2xx, otherwise log the body and fail the run
fn check_response(label: &str, response: ApiResponse) -> Result<serde_json::Value> {
    if response.is_success() {
        let body = response.json();
        info!("{} {}", label, body);
        return Ok(body);
    }

    error!(status = %response.status, body = %response.body, "{}", label);
    Err(ProvisionError::Status {
        operation: label.trim_end_matches(':').to_string(),
        status: response.status,
        body: response.body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarketplaceNames;
    use aws_client::{http_client, Credentials, RetryPolicy, SignedClient, Signer};
    use httpmock::MockServer;
    use serde_json::json;
    use tracing_test::traced_test;

    fn provisioner(server: &MockServer) -> Provisioner {
        let signed = SignedClient::new(
            http_client().unwrap(),
            Credentials::new("AKID", "secret", Some("token".into())),
            Signer::new("es", "eu-west-1").sign_content_sha256(),
            RetryPolicy::opensearch().without_backoff(),
        );
        Provisioner::new(OpenSearchClient::new(&server.base_url(), signed))
    }

    fn plan() -> MarketplacePlan {
        MarketplacePlan {
            names: MarketplaceNames::new("acme", "prod"),
            index_alias_mgmt: "mgmt-logs".into(),
            users_agent: vec!["agent".into()],
            users_dashboard: vec!["arn:aws:iam::1:role/analyst".into()],
        }
    }

    const SIZING: Sizing = Sizing {
        shards: 1,
        replicas: 1,
    };

    #[tokio::test]
    #[traced_test]
    async fn test_accepted_response_logged_at_info() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/_plugins/_security/api/tenants/acme");
                then.status(200)
                    .json_body(json!({"status": "CREATED", "message": "'acme' created."}));
            })
            .await;

        provisioner(&server)
            .create_marketplace_tenant("acme")
            .await
            .unwrap();

        logs_assert(|lines: &[&str]| {
            lines
                .iter()
                .find(|line| line.contains("INFO") && line.contains("Tenant creation:"))
                .map(|_| ())
                .ok_or_else(|| "tenant response not logged at info".to_string())
        });
    }

    #[tokio::test]
    async fn test_index_pattern_conflict_is_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/_dashboards/api/saved_objects/index-pattern/acme-prod")
                    .header("osd-xsrf", "true")
                    .header("security_tenant", "acme")
                    .json_body(json!({
                        "attributes": {"title": "acme-prod", "timeFieldName": "@timestamp"}
                    }));
                then.status(409).json_body(json!({"error": "Conflict"}));
            })
            .await;

        provisioner(&server)
            .create_index_pattern("acme-prod", "acme")
            .await
            .unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_index_pattern_other_errors_abort() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST")
                    .path("/_dashboards/api/saved_objects/index-pattern/acme-prod");
                then.status(400).body("bad request");
            })
            .await;

        let err = provisioner(&server)
            .create_index_pattern("acme-prod", "acme")
            .await
            .unwrap_err();

        match err {
            ProvisionError::Status { status, body, .. } => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(body, "bad request");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_conflict_aborts_other_operations() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/_plugins/_security/api/tenants/acme");
                then.status(409).body("exists");
            })
            .await;

        let err = provisioner(&server)
            .create_marketplace_tenant("acme")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::Status { status, .. } if status == StatusCode::CONFLICT
        ));
    }

    #[tokio::test]
    async fn test_retry_budget_exhaustion_aborts() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method("PUT").path("/_index_template/acme");
                then.status(500);
            })
            .await;

        let template = policy::marketplace_template(&plan().names, &SIZING);
        let err = provisioner(&server)
            .create_index_template("acme", &template)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::Transport(aws_client::Error::RetriesExhausted { attempts: 6, .. })
        ));
        mock.assert_hits_async(6).await;
    }

    #[tokio::test]
    async fn test_failed_role_stops_iteration() {
        let server = MockServer::start_async().await;
        let agent = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/_plugins/_security/api/roles/acme-role-agent");
                then.status(400).body("invalid role");
            })
            .await;
        let dashboard = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/_plugins/_security/api/roles/acme-role-dashboard");
                then.status(200).json_body(json!({"status": "OK"}));
            })
            .await;

        let plan = plan();
        let result = provisioner(&server)
            .create_roles(&policy::roles(&plan.names, &plan.index_alias_mgmt))
            .await;

        assert!(result.is_err());
        agent.assert_hits_async(1).await;
        dashboard.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_update_master_users_mapping() {
        let server = MockServer::start_async().await;
        let users = vec![
            "arn:aws:iam::1:role/admin".to_string(),
            "arn:aws:iam::1:role/cognito".to_string(),
        ];
        let patch_body = json!([{
            "op": "replace",
            "path": "/backend_roles",
            "value": ["arn:aws:iam::1:role/admin", "arn:aws:iam::1:role/cognito"]
        }]);

        let mut mocks = Vec::new();
        for role in ["all_access", "security_manager"] {
            let path = format!("/_plugins/_security/api/rolesmapping/{}", role);
            let body = patch_body.clone();
            let patch_path = path.clone();
            mocks.push(
                server
                    .mock_async(move |when, then| {
                        when.method("PATCH").path(patch_path).json_body(body);
                        then.status(200).json_body(json!({"status": "OK"}));
                    })
                    .await,
            );
            mocks.push(
                server
                    .mock_async(move |when, then| {
                        when.method("GET").path(path);
                        then.status(200)
                            .json_body(json!({"backend_roles": ["arn:aws:iam::1:role/admin"]}));
                    })
                    .await,
            );
        }

        provisioner(&server)
            .update_master_users_mapping(&users)
            .await
            .unwrap();

        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_marketplace_run_issues_every_call_once() {
        let server = MockServer::start_async().await;
        let plan = plan();

        let paths = [
            ("PUT", "/_index_template/acme"),
            ("PUT", "/_plugins/_security/api/tenants/acme"),
            ("PUT", "/_plugins/_security/api/actiongroups/acme-group-agent"),
            ("PUT", "/_plugins/_security/api/actiongroups/acme-group-dashboard"),
            ("POST", "/_dashboards/api/saved_objects/index-pattern/acme-prod"),
            ("PUT", "/_plugins/_security/api/roles/acme-role-agent"),
            ("PUT", "/_plugins/_security/api/roles/acme-role-dashboard"),
            ("PUT", "/_plugins/_security/api/rolesmapping/acme-role-agent"),
            ("PUT", "/_plugins/_security/api/rolesmapping/acme-role-dashboard"),
        ];

        let mut mocks = Vec::new();
        for (method, path) in paths {
            mocks.push(
                server
                    .mock_async(move |when, then| {
                        when.method(method).path(path);
                        then.status(200).json_body(json!({"status": "OK"}));
                    })
                    .await,
            );
        }
        provisioner(&server)
            .run_marketplace(&plan, &SIZING)
            .await
            .unwrap();

        for mock in mocks {
            mock.assert_async().await;
        }
    }

    #[tokio::test]
    async fn test_marketplace_run_stops_at_first_failure() {
        let server = MockServer::start_async().await;
        let template = server
            .mock_async(|when, then| {
                when.method("PUT").path("/_index_template/acme");
                then.status(200).json_body(json!({"acknowledged": true}));
            })
            .await;
        let tenant = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/_plugins/_security/api/tenants/acme");
                then.status(400).body("tenant rejected");
            })
            .await;
        let later = server
            .mock_async(|when, then| {
                when.path_contains("/actiongroups/");
                then.status(200);
            })
            .await;

        let result = provisioner(&server).run_marketplace(&plan(), &SIZING).await;

        assert!(result.is_err());
        template.assert_async().await;
        tenant.assert_async().await;
        later.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_control_run() {
        let server = MockServer::start_async().await;
        let template = server
            .mock_async(|when, then| {
                when.method("PUT")
                    .path("/_index_template/mgmt")
                    .json_body(json!({
                        "index_patterns": ["mgmt-logs"],
                        "data_stream": {},
                        "priority": 100,
                        "template": {"settings": {"number_of_shards": "1", "number_of_replicas": "1"}}
                    }));
                then.status(200).json_body(json!({"acknowledged": true}));
            })
            .await;
        let mappings = server
            .mock_async(|when, then| {
                when.path_contains("/_plugins/_security/api/rolesmapping/");
                then.status(200).json_body(json!({"status": "OK"}));
            })
            .await;

        let plan = ControlPlan {
            index_alias_mgmt: "mgmt-logs".into(),
            master_users: vec!["a".into(), "b".into()],
        };
        provisioner(&server).run_control(&plan, &SIZING).await.unwrap();

        template.assert_async().await;
        // PATCH + GET for each master role
        mappings.assert_hits_async(4).await;
    }

    #[tokio::test]
    async fn test_dry_run_sends_nothing() {
        let provisioner = Provisioner::new(OpenSearchClient::dry_run("https://search.example.com"));

        provisioner.run_marketplace(&plan(), &SIZING).await.unwrap();
    }
}
