//! Provisioning Policy
//!
//! The fixed access model every marketplace receives: two action groups,
//! two roles and their mappings, plus the data stream templates.

use crate::config::{backing_index_pattern, MarketplaceNames, MarketplacePlan, Sizing};
use crate::payloads::{
    strings, ActionGroup, IndexPermission, IndexSettings, IndexTemplate, Role, RoleMapping,
    TenantPermission,
};

/// Priority of every data stream template
pub const TEMPLATE_PRIORITY: u32 = 100;

/// Template name used in control mode
pub const CONTROL_TEMPLATE_NAME: &str = "mgmt";

/// Time field of the Dashboards index pattern
pub const TIME_FIELD: &str = "@timestamp";

/// Built-in roles that make a principal a cluster master user
pub const MASTER_ROLES: [&str; 2] = ["all_access", "security_manager"];

/// Permission lists of the per-marketplace action groups
pub mod actions {
    /// Ingestion agents: write into their data stream, manage pipelines
    pub const AGENT: &[&str] = &[
        "write",
        "cluster:monitor/main",
        "indices:admin/template/get",
        "indices:admin/create",
        "cluster:admin/ingest/pipeline/get",
        "cluster:admin/ingest/pipeline/put",
    ];

    /// Dashboard users: search, manage and monitor their indices
    pub const DASHBOARD: &[&str] = &[
        "search",
        "cluster_all",
        "index",
        "manage",
        "read",
        "write",
        "cluster_composite_ops",
        "indices_monitor",
        "cluster:admin/opendistro/ism/*",
        "indices:monitor/settings/get",
        "indices:admin/aliases/get*",
    ];

    pub const CLUSTER_BASE: &str = "cluster_composite_ops";
    pub const TENANT_READ: &str = "kibana_all_read";
    pub const TENANT_WRITE: &str = "kibana_all_write";
}

fn settings(sizing: &Sizing) -> IndexSettings {
    IndexSettings {
        number_of_shards: sizing.shards,
        number_of_replicas: sizing.replicas,
    }
}

/// Data stream template for the marketplace alias
pub fn marketplace_template(names: &MarketplaceNames, sizing: &Sizing) -> IndexTemplate {
    IndexTemplate::data_stream(&names.index_alias, TEMPLATE_PRIORITY, settings(sizing))
}

/// Data stream template for the management alias
pub fn control_template(index_alias_mgmt: &str, sizing: &Sizing) -> IndexTemplate {
    IndexTemplate::data_stream(index_alias_mgmt, TEMPLATE_PRIORITY, settings(sizing))
}

pub fn action_groups(names: &MarketplaceNames) -> Vec<ActionGroup> {
    vec![
        ActionGroup::new(&names.group_agent, actions::AGENT),
        ActionGroup::new(&names.group_dashboard, actions::DASHBOARD),
    ]
}

/// Agent and dashboard roles.
///
/// Agents also write to the management data stream; dashboard users only
/// see their own marketplace.
pub fn roles(names: &MarketplaceNames, index_alias_mgmt: &str) -> Vec<Role> {
    let agent = Role {
        name: names.role_agent.clone(),
        cluster_permissions: vec![actions::CLUSTER_BASE.to_string(), names.group_agent.clone()],
        index_permissions: vec![IndexPermission::new(
            vec![
                names.index_alias.clone(),
                names.backing_index_pattern(),
                index_alias_mgmt.to_string(),
                backing_index_pattern(index_alias_mgmt),
            ],
            vec![names.group_agent.clone()],
        )],
        tenant_permissions: vec![TenantPermission {
            tenant_patterns: vec![names.tenant.clone()],
            allowed_actions: strings(&[actions::TENANT_READ]),
        }],
    };

    let dashboard = Role {
        name: names.role_dashboard.clone(),
        cluster_permissions: vec![
            actions::CLUSTER_BASE.to_string(),
            names.group_dashboard.clone(),
        ],
        index_permissions: vec![IndexPermission::new(
            vec![names.index_alias.clone(), names.backing_index_pattern()],
            vec![names.group_dashboard.clone()],
        )],
        tenant_permissions: vec![TenantPermission {
            tenant_patterns: vec![names.tenant.clone()],
            allowed_actions: strings(&[actions::TENANT_WRITE]),
        }],
    };

    vec![agent, dashboard]
}

/// Agents map as internal users, dashboard users as backend roles
pub fn role_mappings(plan: &MarketplacePlan) -> Vec<RoleMapping> {
    vec![
        RoleMapping::users(&plan.names.role_agent, plan.users_agent.clone()),
        RoleMapping::backend_roles(&plan.names.role_dashboard, plan.users_dashboard.clone()),
    ]
}
