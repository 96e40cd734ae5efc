use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use cloudtrust_domain::PolicyDocument;

/// Provider-side view of a role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderRole {
    /// Role name.
    pub name: String,
    /// Provider identifier such as an IAM role ARN.
    pub provider_role_id: String,
    /// Provider-internal unique id.
    pub role_id: Option<String>,
    /// Path prefix.
    pub path: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Session duration bound in seconds.
    pub max_session_duration: Option<i32>,
    /// Trust policy as returned by the provider.
    pub assume_role_policy_document: Option<PolicyDocument>,
    /// Permissions boundary policy identifier.
    pub permissions_boundary: Option<String>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last time the role was used, when reported.
    pub last_used_at: Option<DateTime<Utc>>,
    /// Role tags.
    pub tags: BTreeMap<String, String>,
}

/// Input for creating a provider role.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProviderRoleInput {
    /// Role name.
    pub name: String,
    /// Optional path prefix.
    pub path: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Trust policy naming who may assume the role.
    pub assume_role_policy_document: PolicyDocument,
    /// Optional session duration bound in seconds.
    pub max_session_duration: Option<i32>,
    /// Optional permissions boundary policy identifier.
    pub permissions_boundary: Option<String>,
    /// Role tags.
    pub tags: BTreeMap<String, String>,
}

/// Partial update for a provider role.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateProviderRoleInput {
    /// Role name.
    pub name: String,
    /// New description.
    pub description: Option<String>,
    /// New session duration bound.
    pub max_session_duration: Option<i32>,
    /// Replacement trust policy.
    pub assume_role_policy_document: Option<PolicyDocument>,
}

/// Managed policy attached to a provider role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttachedPolicy {
    /// Policy name.
    pub name: String,
    /// Provider policy identifier.
    pub provider_policy_id: String,
}
