use cloudtrust_domain::{
    AuthMethod, CspAccount, CspAccountId, CspIdpConfig, CspPolicy, CspRole, CspType, PolicyType,
};

/// Filter for listing CSP accounts. Fields combine with AND; `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspAccountFilter {
    /// Provider family.
    pub csp_type: Option<CspType>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Case-insensitive name substring.
    pub name_contains: Option<String>,
}

impl CspAccountFilter {
    /// Returns true when the account satisfies every set field.
    #[must_use]
    pub fn matches(&self, account: &CspAccount) -> bool {
        self.csp_type
            .is_none_or(|csp_type| account.csp_type() == csp_type)
            && self
                .is_active
                .is_none_or(|is_active| account.is_active() == is_active)
            && name_matches(self.name_contains.as_deref(), account.name().as_str())
    }
}

/// Filter for listing IdP configurations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspIdpConfigFilter {
    /// Owning account.
    pub csp_account_id: Option<CspAccountId>,
    /// Trust method.
    pub auth_method: Option<AuthMethod>,
    /// Active flag.
    pub is_active: Option<bool>,
    /// Case-insensitive name substring.
    pub name_contains: Option<String>,
}

impl CspIdpConfigFilter {
    /// Returns true when the configuration satisfies every set field.
    #[must_use]
    pub fn matches(&self, config: &CspIdpConfig) -> bool {
        self.csp_account_id
            .is_none_or(|account_id| config.csp_account_id() == account_id)
            && self
                .auth_method
                .is_none_or(|auth_method| config.auth_method() == auth_method)
            && self
                .is_active
                .is_none_or(|is_active| config.is_active() == is_active)
            && name_matches(self.name_contains.as_deref(), config.name().as_str())
    }
}

/// Filter for listing CSP policies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspPolicyFilter {
    /// Owning account.
    pub csp_account_id: Option<CspAccountId>,
    /// Policy kind.
    pub policy_type: Option<PolicyType>,
    /// Case-insensitive name substring.
    pub name_contains: Option<String>,
}

impl CspPolicyFilter {
    /// Returns true when the policy satisfies every set field.
    #[must_use]
    pub fn matches(&self, policy: &CspPolicy) -> bool {
        self.csp_account_id
            .is_none_or(|account_id| policy.csp_account_id() == account_id)
            && self
                .policy_type
                .is_none_or(|policy_type| policy.policy_type() == policy_type)
            && name_matches(self.name_contains.as_deref(), policy.name().as_str())
    }
}

/// Filter for listing CSP roles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspRoleFilter {
    /// Provider family.
    pub csp_type: Option<CspType>,
    /// Owning account.
    pub csp_account_id: Option<CspAccountId>,
    /// Case-insensitive name substring.
    pub name_contains: Option<String>,
}

impl CspRoleFilter {
    /// Returns true when the role satisfies every set field.
    #[must_use]
    pub fn matches(&self, role: &CspRole) -> bool {
        self.csp_type
            .is_none_or(|csp_type| role.csp_type() == csp_type)
            && self
                .csp_account_id
                .is_none_or(|account_id| role.csp_account_id() == Some(account_id))
            && name_matches(self.name_contains.as_deref(), role.name().as_str())
    }
}

fn name_matches(needle: Option<&str>, name: &str) -> bool {
    needle.is_none_or(|needle| name.to_lowercase().contains(&needle.to_lowercase()))
}
