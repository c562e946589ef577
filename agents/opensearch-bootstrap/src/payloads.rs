//! OpenSearch Security and Dashboards Payloads
//!
//! Typed request bodies for every call the provisioner makes. Field order
//! follows the JSON the cluster has always been sent.

use serde::{Serialize, Serializer};

// ============================================================
// Index templates
// ============================================================

/// Composable index template backing a data stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexTemplate {
    pub index_patterns: Vec<String>,
    /// Present and empty: indices matching the pattern become data streams
    pub data_stream: DataStream,
    pub priority: u32,
    pub template: TemplateBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataStream {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateBody {
    pub settings: IndexSettings,
}

/// Shard layout; sent as strings like the environment values they come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexSettings {
    #[serde(serialize_with = "as_string")]
    pub number_of_shards: u32,
    #[serde(serialize_with = "as_string")]
    pub number_of_replicas: u32,
}

fn as_string<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

impl IndexTemplate {
    pub fn data_stream(index_pattern: impl Into<String>, priority: u32, settings: IndexSettings) -> Self {
        Self {
            index_patterns: vec![index_pattern.into()],
            data_stream: DataStream::default(),
            priority,
            template: TemplateBody { settings },
        }
    }
}

// ============================================================
// Security plugin
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tenant {
    pub description: String,
}

impl Tenant {
    pub fn private(name: &str) -> Self {
        Self {
            description: format!("Private tenant for {}", name),
        }
    }
}

/// Named bundle of permissions
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionGroup {
    #[serde(skip)]
    pub name: String,
    pub allowed_actions: Vec<String>,
}

impl ActionGroup {
    pub fn new(name: impl Into<String>, actions: &[&str]) -> Self {
        Self {
            name: name.into(),
            allowed_actions: strings(actions),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Role {
    #[serde(skip)]
    pub name: String,
    pub cluster_permissions: Vec<String>,
    pub index_permissions: Vec<IndexPermission>,
    pub tenant_permissions: Vec<TenantPermission>,
}

/// Index permission with empty document/field level security
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexPermission {
    pub index_patterns: Vec<String>,
    pub dls: String,
    pub fls: Vec<String>,
    pub masked_fields: Vec<String>,
    pub allowed_actions: Vec<String>,
}

impl IndexPermission {
    pub fn new(index_patterns: Vec<String>, allowed_actions: Vec<String>) -> Self {
        Self {
            index_patterns,
            dls: String::new(),
            fls: Vec::new(),
            masked_fields: Vec::new(),
            allowed_actions,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TenantPermission {
    pub tenant_patterns: Vec<String>,
    pub allowed_actions: Vec<String>,
}

/// Binds a role either to internal users or to backend roles (IAM principals)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleMapping {
    #[serde(skip)]
    pub role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend_roles: Option<Vec<String>>,
}

impl RoleMapping {
    pub fn users(role: impl Into<String>, users: Vec<String>) -> Self {
        Self {
            role: role.into(),
            users: Some(users),
            backend_roles: None,
        }
    }

    pub fn backend_roles(role: impl Into<String>, backend_roles: Vec<String>) -> Self {
        Self {
            role: role.into(),
            users: None,
            backend_roles: Some(backend_roles),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Replace,
}

/// Single JSON Patch (RFC 6902) operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    pub value: Vec<String>,
}

impl PatchOperation {
    pub fn replace(path: impl Into<String>, value: Vec<String>) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value,
        }
    }
}

// ============================================================
// Dashboards saved objects
// ============================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexPattern {
    pub attributes: IndexPatternAttributes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexPatternAttributes {
    pub title: String,
    #[serde(rename = "timeFieldName")]
    pub time_field_name: String,
}

impl IndexPattern {
    pub fn new(title: impl Into<String>, time_field_name: impl Into<String>) -> Self {
        Self {
            attributes: IndexPatternAttributes {
                title: title.into(),
                time_field_name: time_field_name.into(),
            },
        }
    }
}

pub(crate) fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
