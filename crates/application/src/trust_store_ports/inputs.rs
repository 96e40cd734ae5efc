use cloudtrust_domain::{
    AccountDescriptors, AuthMethod, CspAccountId, CspIdpConfigId, CspType, PolicyDocument,
    PolicyType, TrustConfigEntries,
};
use serde_json::{Map, Value};

/// Input payload for creating CSP accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCspAccountInput {
    /// Display name, unique per CSP type.
    pub name: String,
    /// Provider family.
    pub csp_type: CspType,
    /// Provider descriptors such as `account_id` and `region`.
    pub descriptors: AccountDescriptors,
    /// Optional description.
    pub description: Option<String>,
    /// Initial active flag.
    pub is_active: bool,
}

/// Partial update for a CSP account; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCspAccountInput {
    /// New display name.
    pub name: Option<String>,
    /// Replacement descriptor set.
    pub descriptors: Option<AccountDescriptors>,
    /// New description.
    pub description: Option<String>,
}

/// Input payload for creating IdP configurations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCspIdpConfigInput {
    /// Name, unique per account.
    pub name: String,
    /// Owning account.
    pub csp_account_id: CspAccountId,
    /// Trust method.
    pub auth_method: AuthMethod,
    /// Method-specific configuration keys.
    pub config: TrustConfigEntries,
    /// Optional description.
    pub description: Option<String>,
    /// Initial active flag.
    pub is_active: bool,
}

/// Partial update for an IdP configuration; a new key map is validated again.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateCspIdpConfigInput {
    /// New name.
    pub name: Option<String>,
    /// New trust method; requires `config`.
    pub auth_method: Option<AuthMethod>,
    /// Replacement configuration keys.
    pub config: Option<TrustConfigEntries>,
    /// New description.
    pub description: Option<String>,
}

/// Input payload for creating CSP policies.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCspPolicyInput {
    /// Name, unique per account.
    pub name: String,
    /// Owning account.
    pub csp_account_id: CspAccountId,
    /// Policy kind.
    pub policy_type: PolicyType,
    /// Provider-side identifier.
    pub provider_policy_id: Option<String>,
    /// Permission document.
    pub document: PolicyDocument,
    /// Optional description.
    pub description: Option<String>,
}

/// Partial update for a CSP policy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateCspPolicyInput {
    /// New name.
    pub name: Option<String>,
    /// New policy kind.
    pub policy_type: Option<PolicyType>,
    /// New provider-side identifier.
    pub provider_policy_id: Option<String>,
    /// Replacement document.
    pub document: Option<PolicyDocument>,
    /// New description.
    pub description: Option<String>,
}

/// Input payload for registering CSP roles.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateCspRoleInput {
    /// Role name, unique per CSP type.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Provider family.
    pub csp_type: CspType,
    /// Identity-broker-side identifier.
    pub idp_identifier: Option<String>,
    /// Provider-side role identifier.
    pub provider_role_id: Option<String>,
    /// Optional status label.
    pub status: Option<String>,
    /// Session duration bound in seconds.
    pub max_session_duration: Option<i32>,
    /// Provider path prefix.
    pub path: Option<String>,
    /// Owning account.
    pub csp_account_id: Option<CspAccountId>,
    /// IdP configuration used for issuance.
    pub csp_idp_config_id: Option<CspIdpConfigId>,
    /// Provider-specific settings.
    pub extended_config: Map<String, Value>,
}
