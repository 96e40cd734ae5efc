use async_trait::async_trait;

use cloudtrust_core::AppResult;
use cloudtrust_domain::{
    CspAccount, CspAccountId, CspIdpConfig, CspIdpConfigId, CspPolicy, CspPolicyId, CspRole,
    CspRoleId, CspType,
};

use super::filters::{CspAccountFilter, CspIdpConfigFilter, CspPolicyFilter, CspRoleFilter};

/// Repository port for CSP accounts.
#[async_trait]
pub trait CspAccountRepository: Send + Sync {
    /// Inserts a new account.
    async fn insert_account(&self, account: CspAccount) -> AppResult<()>;

    /// Replaces a stored account.
    async fn update_account(&self, account: CspAccount) -> AppResult<()>;

    /// Finds an account by id.
    async fn find_account(&self, account_id: CspAccountId) -> AppResult<Option<CspAccount>>;

    /// Finds an account by its (name, CSP type) key.
    async fn find_account_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspAccount>>;

    /// Returns whether an account exists.
    async fn account_exists(&self, account_id: CspAccountId) -> AppResult<bool>;

    /// Returns whether the (name, CSP type) key is taken.
    async fn account_exists_by_name(&self, name: &str, csp_type: CspType) -> AppResult<bool>;

    /// Lists accounts matching the filter.
    async fn list_accounts(&self, filter: &CspAccountFilter) -> AppResult<Vec<CspAccount>>;

    /// Deletes an account unless IdP configs or policies reference it.
    ///
    /// The dependent counts and the delete run in one transaction.
    async fn delete_account(&self, account_id: CspAccountId) -> AppResult<()>;
}

/// Repository port for IdP trust configurations.
#[async_trait]
pub trait CspIdpConfigRepository: Send + Sync {
    /// Inserts a new configuration.
    async fn insert_idp_config(&self, config: CspIdpConfig) -> AppResult<()>;

    /// Replaces a stored configuration.
    async fn update_idp_config(&self, config: CspIdpConfig) -> AppResult<()>;

    /// Finds a configuration by id.
    async fn find_idp_config(
        &self,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<Option<CspIdpConfig>>;

    /// Returns whether the (name, account) key is taken.
    async fn idp_config_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool>;

    /// Lists configurations matching the filter.
    async fn list_idp_configs(&self, filter: &CspIdpConfigFilter)
    -> AppResult<Vec<CspIdpConfig>>;

    /// Deletes a configuration.
    async fn delete_idp_config(&self, idp_config_id: CspIdpConfigId) -> AppResult<()>;
}

/// Repository port for CSP policies and their role attachments.
#[async_trait]
pub trait CspPolicyRepository: Send + Sync {
    /// Inserts a new policy.
    async fn insert_policy(&self, policy: CspPolicy) -> AppResult<()>;

    /// Replaces a stored policy.
    async fn update_policy(&self, policy: CspPolicy) -> AppResult<()>;

    /// Finds a policy by id.
    async fn find_policy(&self, policy_id: CspPolicyId) -> AppResult<Option<CspPolicy>>;

    /// Finds a policy in an account by its provider-side identifier.
    async fn find_policy_by_provider_id(
        &self,
        csp_account_id: CspAccountId,
        provider_policy_id: &str,
    ) -> AppResult<Option<CspPolicy>>;

    /// Returns whether the (name, account) key is taken.
    async fn policy_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool>;

    /// Lists policies matching the filter.
    async fn list_policies(&self, filter: &CspPolicyFilter) -> AppResult<Vec<CspPolicy>>;

    /// Deletes a policy unless attached to a role, removing attachment rows in the same transaction.
    async fn delete_policy(&self, policy_id: CspPolicyId) -> AppResult<()>;

    /// Attaches a policy to a CSP role after checking both exist.
    async fn attach_policy_to_role(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()>;

    /// Removes one attachment.
    async fn detach_policy_from_role(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()>;

    /// Lists policies attached to a CSP role.
    async fn list_policies_for_role(&self, csp_role_id: CspRoleId) -> AppResult<Vec<CspPolicy>>;

    /// Lists CSP roles a policy is attached to.
    async fn list_role_ids_for_policy(&self, policy_id: CspPolicyId)
    -> AppResult<Vec<CspRoleId>>;
}

/// Repository port for CSP-native roles.
#[async_trait]
pub trait CspRoleRepository: Send + Sync {
    /// Inserts a new CSP role.
    async fn insert_csp_role(&self, role: CspRole) -> AppResult<()>;

    /// Finds a CSP role by id.
    async fn find_csp_role(&self, csp_role_id: CspRoleId) -> AppResult<Option<CspRole>>;

    /// Finds a CSP role by its (name, CSP type) key.
    async fn find_csp_role_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspRole>>;

    /// Returns whether the (name, CSP type) key is taken.
    async fn csp_role_exists_by_name(&self, name: &str, csp_type: CspType) -> AppResult<bool>;

    /// Lists CSP roles matching the filter.
    async fn list_csp_roles(&self, filter: &CspRoleFilter) -> AppResult<Vec<CspRole>>;

    /// Deletes a CSP role unless it is mapped or has attached policies.
    async fn delete_csp_role(&self, csp_role_id: CspRoleId) -> AppResult<()>;
}
