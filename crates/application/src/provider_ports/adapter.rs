use async_trait::async_trait;

use cloudtrust_core::{AppResult, CallContext};
use cloudtrust_domain::{CspType, PolicyDocument};

use super::policies::{CreateProviderPolicyInput, PolicyListFilter, PolicyPage, ProviderPolicy};
use super::roles::{
    CreateProviderRoleInput, ProviderAttachedPolicy, ProviderRole, UpdateProviderRoleInput,
};
use super::session::{
    AssumeRoleRequest, AssumeRoleWithSamlRequest, AssumeRoleWithWebIdentityRequest,
    IssuedCredentials, ProviderCallerIdentity, ProviderSession,
};

/// Uniform federation contract implemented once per CSP type.
///
/// Every method is bound by the deadline in [`CallContext`]. Implementations
/// report failures as `NotFound`, `AlreadyExists`, `PermissionDenied`,
/// `ProviderUnavailable`, `InvalidArgument` or `Provider`, and return
/// `Unimplemented` for capabilities not backed for their provider.
#[async_trait]
pub trait CloudProviderAdapter: Send + Sync {
    /// Returns the provider family served by this adapter.
    fn csp_type(&self) -> CspType;

    /// Creates a provider role.
    async fn create_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        input: CreateProviderRoleInput,
    ) -> AppResult<ProviderRole>;

    /// Reads a provider role by name.
    async fn get_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<ProviderRole>;

    /// Updates description, session bound or trust policy of a role.
    async fn update_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        input: UpdateProviderRoleInput,
    ) -> AppResult<ProviderRole>;

    /// Deletes a provider role.
    async fn delete_role(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<()>;

    /// Attaches a managed policy to a role.
    async fn attach_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        provider_policy_id: &str,
    ) -> AppResult<()>;

    /// Detaches a managed policy from a role.
    async fn detach_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        provider_policy_id: &str,
    ) -> AppResult<()>;

    /// Lists managed policies attached to a role.
    async fn list_attached_role_policies(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<Vec<ProviderAttachedPolicy>>;

    /// Lists inline policy names of a role.
    async fn list_role_policies(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<Vec<String>>;

    /// Reads an inline role policy document.
    async fn get_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
    ) -> AppResult<PolicyDocument>;

    /// Creates or replaces an inline role policy document.
    async fn put_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
        document: &PolicyDocument,
    ) -> AppResult<()>;

    /// Deletes an inline role policy.
    async fn delete_role_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
    ) -> AppResult<()>;

    /// Creates a managed policy.
    async fn create_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        input: CreateProviderPolicyInput,
    ) -> AppResult<ProviderPolicy>;

    /// Reads managed policy metadata.
    async fn get_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
    ) -> AppResult<ProviderPolicy>;

    /// Reads a managed policy document, using the default version when `version_id` is `None`.
    async fn get_policy_document(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
        version_id: Option<&str>,
    ) -> AppResult<PolicyDocument>;

    /// Publishes a new default version of a managed policy.
    async fn update_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
        document: &PolicyDocument,
    ) -> AppResult<ProviderPolicy>;

    /// Deletes a managed policy.
    async fn delete_policy(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        provider_policy_id: &str,
    ) -> AppResult<()>;

    /// Lists one page of managed policies.
    async fn list_policies(
        &self,
        context: &CallContext,
        session: &ProviderSession,
        filter: &PolicyListFilter,
    ) -> AppResult<PolicyPage>;

    /// Exchanges a web identity token for temporary credentials.
    async fn assume_role_with_web_identity(
        &self,
        context: &CallContext,
        request: AssumeRoleWithWebIdentityRequest,
    ) -> AppResult<IssuedCredentials>;

    /// Exchanges a SAML assertion for temporary credentials.
    async fn assume_role_with_saml(
        &self,
        context: &CallContext,
        request: AssumeRoleWithSamlRequest,
    ) -> AppResult<IssuedCredentials>;

    /// Assumes a role using the session's static credentials as caller.
    async fn assume_role(
        &self,
        context: &CallContext,
        request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials>;

    /// Resolves the identity behind a signed session.
    async fn verify_caller_identity(
        &self,
        context: &CallContext,
        session: &ProviderSession,
    ) -> AppResult<ProviderCallerIdentity>;
}
