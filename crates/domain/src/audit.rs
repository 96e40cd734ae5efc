use serde::{Deserialize, Serialize};

/// Stable audit actions emitted by application use-cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Emitted when a CSP account is created.
    CspAccountCreated,
    /// Emitted when a CSP account is updated, activated or deactivated.
    CspAccountUpdated,
    /// Emitted when a CSP account is deleted.
    CspAccountDeleted,
    /// Emitted when an IdP configuration is created.
    IdpConfigCreated,
    /// Emitted when an IdP configuration is updated, activated or deactivated.
    IdpConfigUpdated,
    /// Emitted when an IdP configuration is deleted.
    IdpConfigDeleted,
    /// Emitted when a CSP policy is created.
    CspPolicyCreated,
    /// Emitted when a CSP policy is updated.
    CspPolicyUpdated,
    /// Emitted when a CSP policy is deleted.
    CspPolicyDeleted,
    /// Emitted when a policy is attached to a CSP role.
    CspPolicyAttached,
    /// Emitted when a policy is detached from a CSP role.
    CspPolicyDetached,
    /// Emitted when a CSP role is created.
    CspRoleCreated,
    /// Emitted when a CSP role is deleted.
    CspRoleDeleted,
    /// Emitted when a role master is created.
    RoleCreated,
    /// Emitted when a role master is deleted.
    RoleDeleted,
    /// Emitted when a role to CSP role mapping is added or updated.
    RoleMappingUpserted,
    /// Emitted when a role to CSP role mapping is removed.
    RoleMappingRemoved,
    /// Emitted when a temporary credential is issued.
    CredentialIssued,
    /// Emitted when a policy sync pass completes.
    PolicySyncCompleted,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CspAccountCreated => "trust.account.created",
            Self::CspAccountUpdated => "trust.account.updated",
            Self::CspAccountDeleted => "trust.account.deleted",
            Self::IdpConfigCreated => "trust.idp_config.created",
            Self::IdpConfigUpdated => "trust.idp_config.updated",
            Self::IdpConfigDeleted => "trust.idp_config.deleted",
            Self::CspPolicyCreated => "trust.policy.created",
            Self::CspPolicyUpdated => "trust.policy.updated",
            Self::CspPolicyDeleted => "trust.policy.deleted",
            Self::CspPolicyAttached => "trust.policy.attached",
            Self::CspPolicyDetached => "trust.policy.detached",
            Self::CspRoleCreated => "trust.csp_role.created",
            Self::CspRoleDeleted => "trust.csp_role.deleted",
            Self::RoleCreated => "mapping.role.created",
            Self::RoleDeleted => "mapping.role.deleted",
            Self::RoleMappingUpserted => "mapping.edge.upserted",
            Self::RoleMappingRemoved => "mapping.edge.removed",
            Self::CredentialIssued => "issuance.credential.issued",
            Self::PolicySyncCompleted => "sync.policy.completed",
        }
    }
}
