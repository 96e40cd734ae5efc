use std::sync::Arc;

use chrono::{DateTime, Utc};
use cloudtrust_core::{AppError, AppResult, CallContext, CallerIdentity};
use cloudtrust_domain::{
    AuditAction, AuthMethod, CspAccount, CspAccountId, CspIdpConfig, CspIdpConfigId,
    IdpTrustConfig, SamlProvider, SecretKeyTrust, TempCredential,
};
use tracing::info;

use crate::provider_ports::{
    AssumeRoleRequest, AssumeRoleWithSamlRequest, AssumeRoleWithWebIdentityRequest,
    IssuedCredentials, ProviderAdapterRegistry, ProviderCallerIdentity, ProviderCredentials,
    ProviderSession,
};
use crate::role_mapping_ports::RoleSelector;
use crate::trust_store_ports::{CspAccountRepository, CspIdpConfigRepository};
use crate::{AuditEvent, AuditRepository, IdentityBroker, RoleMappingService, SecretEncryptor};

mod connection;
mod issuance;

/// Lifetime used when a caller asks for no particular duration.
pub const DEFAULT_CREDENTIAL_DURATION_SECONDS: i32 = 3600;

/// Lifetime of the credential issued by an OIDC connection test.
pub const CONNECTION_TEST_DURATION_SECONDS: i32 = 900;

/// Request for a temporary credential through one IdP configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueCredentialInput {
    /// Trust configuration to federate through.
    pub idp_config_id: CspIdpConfigId,
    /// Provider role identifier to assume, such as an IAM role ARN.
    pub role_identifier: String,
    /// Session name recorded by the provider.
    pub session_name: String,
    /// Requested lifetime; `None` or `0` selects the default.
    pub duration_seconds: Option<i32>,
}

/// Request for a temporary credential on behalf of a platform role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRoleCredentialInput {
    /// Platform role to resolve.
    pub role: RoleSelector,
    /// Trust method to federate with.
    pub auth_method: AuthMethod,
    /// Restricts resolution to CSP roles of one account.
    pub csp_account_id: Option<CspAccountId>,
    /// Session name recorded by the provider.
    pub session_name: String,
    /// Requested lifetime; `None` or `0` selects the default.
    pub duration_seconds: Option<i32>,
}

/// Outcome of a trust configuration connection test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTestReport {
    /// Trust method that was exercised.
    pub auth_method: AuthMethod,
    /// Identity resolved by the provider, for key-based tests.
    pub caller: Option<ProviderCallerIdentity>,
    /// Expiry of the test credential, for federation tests.
    pub credential_expires_at: Option<DateTime<Utc>>,
}

/// Exchanges broker or static proofs of identity for provider credentials.
#[derive(Clone)]
pub struct CredentialIssuanceService {
    account_repository: Arc<dyn CspAccountRepository>,
    idp_config_repository: Arc<dyn CspIdpConfigRepository>,
    role_mapping_service: RoleMappingService,
    adapters: ProviderAdapterRegistry,
    identity_broker: Arc<dyn IdentityBroker>,
    secret_encryptor: Arc<dyn SecretEncryptor>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl CredentialIssuanceService {
    /// Creates a new issuance service.
    #[must_use]
    pub fn new(
        account_repository: Arc<dyn CspAccountRepository>,
        idp_config_repository: Arc<dyn CspIdpConfigRepository>,
        role_mapping_service: RoleMappingService,
        adapters: ProviderAdapterRegistry,
        identity_broker: Arc<dyn IdentityBroker>,
        secret_encryptor: Arc<dyn SecretEncryptor>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            account_repository,
            idp_config_repository,
            role_mapping_service,
            adapters,
            identity_broker,
            secret_encryptor,
            audit_repository,
        }
    }

    /// Loads an active configuration and its active owning account.
    async fn load_active_trust(
        &self,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<(CspIdpConfig, CspAccount)> {
        let config = self
            .idp_config_repository
            .find_idp_config(idp_config_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("idp config '{idp_config_id}' does not exist"))
            })?;
        if !config.is_active() {
            return Err(AppError::InvalidState(format!(
                "idp config '{idp_config_id}' is inactive"
            )));
        }

        let account_id = config.csp_account_id();
        let account = self
            .account_repository
            .find_account(account_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("csp account '{account_id}' does not exist")))?;
        if !account.is_active() {
            return Err(AppError::InvalidState(format!(
                "csp account '{account_id}' is inactive"
            )));
        }

        Ok((config, account))
    }

    /// Returns the static key pair of a configuration, decrypting the secret when stored encrypted.
    fn static_credentials(&self, trust: &SecretKeyTrust) -> AppResult<ProviderCredentials> {
        let secret_access_key = if trust.encrypted {
            self.secret_encryptor.decrypt(&trust.secret_access_key)?
        } else {
            trust.secret_access_key.clone()
        };

        Ok(ProviderCredentials {
            access_key_id: trust.access_key_id.clone(),
            secret_access_key,
            session_token: None,
        })
    }
}

/// Maps an absent or zero duration to the default lifetime.
#[must_use]
pub fn normalize_duration(duration_seconds: Option<i32>) -> i32 {
    match duration_seconds {
        None | Some(0) => DEFAULT_CREDENTIAL_DURATION_SECONDS,
        Some(duration_seconds) => duration_seconds,
    }
}
