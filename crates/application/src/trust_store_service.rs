use std::sync::Arc;

use cloudtrust_core::{AppError, AppResult, CallerIdentity};
use cloudtrust_domain::{AuditAction, CspAccount, CspAccountId};
use tracing::info;

use crate::trust_store_ports::{
    CspAccountRepository, CspIdpConfigRepository, CspPolicyRepository, CspRoleRepository,
};
use crate::{AuditEvent, AuditRepository, SecretEncryptor};

mod accounts;
mod csp_roles;
mod idp_configs;
mod policies;

/// Application service for CSP accounts, IdP trust configurations, policies and CSP roles.
#[derive(Clone)]
pub struct TrustStoreService {
    account_repository: Arc<dyn CspAccountRepository>,
    idp_config_repository: Arc<dyn CspIdpConfigRepository>,
    policy_repository: Arc<dyn CspPolicyRepository>,
    csp_role_repository: Arc<dyn CspRoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
    secret_encryptor: Arc<dyn SecretEncryptor>,
}

impl TrustStoreService {
    /// Creates a new trust store service from its repositories and the secret encryptor.
    #[must_use]
    pub fn new(
        account_repository: Arc<dyn CspAccountRepository>,
        idp_config_repository: Arc<dyn CspIdpConfigRepository>,
        policy_repository: Arc<dyn CspPolicyRepository>,
        csp_role_repository: Arc<dyn CspRoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
        secret_encryptor: Arc<dyn SecretEncryptor>,
    ) -> Self {
        Self {
            account_repository,
            idp_config_repository,
            policy_repository,
            csp_role_repository,
            audit_repository,
            secret_encryptor,
        }
    }

    async fn require_account(&self, account_id: CspAccountId) -> AppResult<CspAccount> {
        self.account_repository
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("csp account '{account_id}' does not exist")))
    }

    async fn record(
        &self,
        actor: &CallerIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: String,
        detail: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                action,
                resource_type,
                resource_id.clone(),
                Some(detail),
            ))
            .await?;

        info!(
            subject = %actor.subject(),
            action = action.as_str(),
            resource_id = %resource_id,
            "trust store updated"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests;
