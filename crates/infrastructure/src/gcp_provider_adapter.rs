//! Google Cloud provider adapter.

use async_trait::async_trait;

use cloudtrust_application::provider_ports::{
    AssumeRoleRequest, AssumeRoleWithSamlRequest, AssumeRoleWithWebIdentityRequest,
    CloudProviderAdapter, CreateProviderPolicyInput, CreateProviderRoleInput, IssuedCredentials,
    PolicyListFilter, PolicyPage, ProviderAttachedPolicy, ProviderCallerIdentity, ProviderPolicy,
    ProviderRole, ProviderSession, UpdateProviderRoleInput,
};
use cloudtrust_core::{AppError, AppResult, CallContext};
use cloudtrust_domain::{CspType, PolicyDocument};

/// Placeholder adapter for Google Cloud.
///
/// Workload identity federation and IAM management are not backed yet; every
/// operation returns `Unimplemented` so callers see a typed failure instead of
/// a missing registry entry.
#[derive(Clone, Debug, Default)]
pub struct GcpProviderAdapter;

impl GcpProviderAdapter {
    /// Creates the adapter.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

fn unimplemented(operation: &str) -> AppError {
    AppError::Unimplemented(format!("gcp adapter does not support {operation} yet"))
}

#[async_trait]
impl CloudProviderAdapter for GcpProviderAdapter {
    fn csp_type(&self) -> CspType {
        CspType::Gcp
    }

    async fn create_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _input: CreateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        Err(unimplemented("create_role"))
    }

    async fn get_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<ProviderRole> {
        Err(unimplemented("get_role"))
    }

    async fn update_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _input: UpdateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        Err(unimplemented("update_role"))
    }

    async fn delete_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<()> {
        Err(unimplemented("delete_role"))
    }

    async fn attach_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _provider_policy_id: &str,
    ) -> AppResult<()> {
        Err(unimplemented("attach_role_policy"))
    }

    async fn detach_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _provider_policy_id: &str,
    ) -> AppResult<()> {
        Err(unimplemented("detach_role_policy"))
    }

    async fn list_attached_role_policies(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<Vec<ProviderAttachedPolicy>> {
        Err(unimplemented("list_attached_role_policies"))
    }

    async fn list_role_policies(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<Vec<String>> {
        Err(unimplemented("list_role_policies"))
    }

    async fn get_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _policy_name: &str,
    ) -> AppResult<PolicyDocument> {
        Err(unimplemented("get_role_policy"))
    }

    async fn put_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _policy_name: &str,
        _document: &PolicyDocument,
    ) -> AppResult<()> {
        Err(unimplemented("put_role_policy"))
    }

    async fn delete_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _policy_name: &str,
    ) -> AppResult<()> {
        Err(unimplemented("delete_role_policy"))
    }

    async fn create_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _input: CreateProviderPolicyInput,
    ) -> AppResult<ProviderPolicy> {
        Err(unimplemented("create_policy"))
    }

    async fn get_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _provider_policy_id: &str,
    ) -> AppResult<ProviderPolicy> {
        Err(unimplemented("get_policy"))
    }

    async fn get_policy_document(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _provider_policy_id: &str,
        _version_id: Option<&str>,
    ) -> AppResult<PolicyDocument> {
        Err(unimplemented("get_policy_document"))
    }

    async fn update_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _provider_policy_id: &str,
        _document: &PolicyDocument,
    ) -> AppResult<ProviderPolicy> {
        Err(unimplemented("update_policy"))
    }

    async fn delete_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _provider_policy_id: &str,
    ) -> AppResult<()> {
        Err(unimplemented("delete_policy"))
    }

    async fn list_policies(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _filter: &PolicyListFilter,
    ) -> AppResult<PolicyPage> {
        Err(unimplemented("list_policies"))
    }

    async fn assume_role_with_web_identity(
        &self,
        _context: &CallContext,
        _request: AssumeRoleWithWebIdentityRequest,
    ) -> AppResult<IssuedCredentials> {
        Err(unimplemented("assume_role_with_web_identity"))
    }

    async fn assume_role_with_saml(
        &self,
        _context: &CallContext,
        _request: AssumeRoleWithSamlRequest,
    ) -> AppResult<IssuedCredentials> {
        Err(unimplemented("assume_role_with_saml"))
    }

    async fn assume_role(
        &self,
        _context: &CallContext,
        _request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials> {
        Err(unimplemented("assume_role"))
    }

    async fn verify_caller_identity(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
    ) -> AppResult<ProviderCallerIdentity> {
        Err(unimplemented("verify_caller_identity"))
    }
}
