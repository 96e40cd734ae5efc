use std::sync::Arc;

use cloudtrust_core::{AppError, AppResult, CallContext, CallerIdentity};
use cloudtrust_domain::{
    AuditAction, CspAccount, CspAccountId, CspPolicy, CspPolicyId, CspPolicyInput,
    PolicyDocument, PolicyType, TempCredential,
};
use tracing::{info, warn};

use crate::credential_issuance_service::IssueCredentialInput;
use crate::provider_ports::{
    PolicyListFilter, PolicyListScope, ProviderAdapterRegistry, ProviderPolicy, ProviderSession,
};
use crate::trust_store_ports::{
    CspAccountRepository, CspIdpConfigFilter, CspIdpConfigRepository, CspPolicyRepository,
};
use crate::{AuditEvent, AuditRepository, CredentialIssuanceService};

mod documents;
mod sync;

/// Session name used for provider policy listing.
pub const POLICY_SYNC_SESSION_NAME: &str = "cloudtrust-policy-sync";

/// Credential lifetime used for provider policy listing.
pub const POLICY_SYNC_DURATION_SECONDS: i32 = 3600;

/// Session name used for fetching one provider policy document.
pub const POLICY_GET_SESSION_NAME: &str = "cloudtrust-policy-get";

/// Credential lifetime used for fetching one provider policy document.
pub const POLICY_GET_DURATION_SECONDS: i32 = 900;

/// Result of one sync pass over an account.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicySyncReport {
    /// Local policies created or refreshed from the provider.
    pub reconciled: Vec<CspPolicy>,
    /// Provider policy names that could not be reconciled.
    pub skipped: Vec<String>,
}

/// Reconciles locally cached CSP policies with the provider's policy store.
#[derive(Clone)]
pub struct PolicySyncService {
    account_repository: Arc<dyn CspAccountRepository>,
    idp_config_repository: Arc<dyn CspIdpConfigRepository>,
    policy_repository: Arc<dyn CspPolicyRepository>,
    credential_issuance_service: CredentialIssuanceService,
    adapters: ProviderAdapterRegistry,
    audit_repository: Arc<dyn AuditRepository>,
}

impl PolicySyncService {
    /// Creates a new policy sync service.
    #[must_use]
    pub fn new(
        account_repository: Arc<dyn CspAccountRepository>,
        idp_config_repository: Arc<dyn CspIdpConfigRepository>,
        policy_repository: Arc<dyn CspPolicyRepository>,
        credential_issuance_service: CredentialIssuanceService,
        adapters: ProviderAdapterRegistry,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            account_repository,
            idp_config_repository,
            policy_repository,
            credential_issuance_service,
            adapters,
            audit_repository,
        }
    }

    async fn require_account(&self, account_id: CspAccountId) -> AppResult<CspAccount> {
        self.account_repository
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("csp account '{account_id}' does not exist")))
    }

    /// Issues a credential for an account through its first active IdP configuration.
    async fn account_credential(
        &self,
        context: &CallContext,
        actor: &CallerIdentity,
        account: &CspAccount,
        session_name: &str,
        duration_seconds: i32,
    ) -> AppResult<TempCredential> {
        let config = self
            .idp_config_repository
            .list_idp_configs(&CspIdpConfigFilter {
                csp_account_id: Some(account.id()),
                is_active: Some(true),
                ..CspIdpConfigFilter::default()
            })
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "csp account '{}' has no active idp config",
                    account.id()
                ))
            })?;

        let role_arn = config.trust().role_arn().ok_or_else(|| {
            AppError::InvalidState(format!(
                "idp config '{}' has no role_arn to act as for account '{}'",
                config.id(),
                account.id()
            ))
        })?;

        self.credential_issuance_service
            .issue_with_idp_config(
                context,
                actor,
                IssueCredentialInput {
                    idp_config_id: config.id(),
                    role_identifier: role_arn.to_owned(),
                    session_name: session_name.to_owned(),
                    duration_seconds: Some(duration_seconds),
                },
            )
            .await
    }
}

#[cfg(test)]
mod tests;
