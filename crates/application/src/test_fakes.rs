use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::Mutex;

use cloudtrust_core::{AppError, AppResult, CallContext, CallerIdentity};
use cloudtrust_domain::{
    AuthMethod, CspAccount, CspAccountId, CspIdpConfig, CspIdpConfigId, CspPolicy, CspPolicyId,
    CspRole, CspRoleId, CspType, PolicyDocument, RoleCspRoleMapping, RoleId, RoleMaster,
    RoleMasterInput, RoleScope,
};

use crate::provider_ports::{
    AssumeRoleRequest, AssumeRoleWithSamlRequest, AssumeRoleWithWebIdentityRequest,
    CreateProviderPolicyInput, CreateProviderRoleInput, IssuedCredentials, PolicyListFilter,
    PolicyPage, ProviderAttachedPolicy, ProviderCallerIdentity, ProviderPolicy, ProviderRole,
    ProviderSession, UpdateProviderRoleInput,
};
use crate::{
    AuditEvent, AuditRepository, BrokerToken, CloudProviderAdapter, CredentialIssuanceService,
    CspAccountFilter, CspAccountRepository, CspIdpConfigFilter, CspIdpConfigRepository,
    CspPolicyFilter, CspPolicyRepository, CspRoleFilter, CspRoleRepository, IdentityBroker,
    PolicySyncService, ProviderAdapterRegistry, RoleMappingRepository, RoleMappingService,
    RoleMasterRepository, SamlAssertion, SecretEncryptor, TrustStoreService,
    UpsertRoleMappingInput,
};

pub(crate) fn actor() -> CallerIdentity {
    CallerIdentity::new("alice", "Alice", None)
}

#[derive(Default)]
pub(crate) struct InMemoryStore {
    pub(crate) accounts: Mutex<Vec<CspAccount>>,
    pub(crate) idp_configs: Mutex<Vec<CspIdpConfig>>,
    pub(crate) policies: Mutex<Vec<CspPolicy>>,
    pub(crate) csp_roles: Mutex<Vec<CspRole>>,
    pub(crate) role_policies: Mutex<Vec<(CspRoleId, CspPolicyId)>>,
    pub(crate) roles: Mutex<Vec<RoleMaster>>,
    pub(crate) mappings: Mutex<Vec<RoleCspRoleMapping>>,
}

#[async_trait]
impl CspAccountRepository for InMemoryStore {
    async fn insert_account(&self, account: CspAccount) -> AppResult<()> {
        self.accounts.lock().await.push(account);
        Ok(())
    }

    async fn update_account(&self, account: CspAccount) -> AppResult<()> {
        let mut accounts = self.accounts.lock().await;
        let stored = accounts
            .iter_mut()
            .find(|stored| stored.id() == account.id())
            .ok_or_else(|| AppError::NotFound(format!("csp account '{}'", account.id())))?;
        *stored = account;
        Ok(())
    }

    async fn find_account(&self, account_id: CspAccountId) -> AppResult<Option<CspAccount>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|account| account.id() == account_id)
            .cloned())
    }

    async fn find_account_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspAccount>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .find(|account| account.name().as_str() == name && account.csp_type() == csp_type)
            .cloned())
    }

    async fn account_exists(&self, account_id: CspAccountId) -> AppResult<bool> {
        Ok(self.find_account(account_id).await?.is_some())
    }

    async fn account_exists_by_name(&self, name: &str, csp_type: CspType) -> AppResult<bool> {
        Ok(self.find_account_by_name(name, csp_type).await?.is_some())
    }

    async fn list_accounts(&self, filter: &CspAccountFilter) -> AppResult<Vec<CspAccount>> {
        Ok(self
            .accounts
            .lock()
            .await
            .iter()
            .filter(|account| filter.matches(account))
            .cloned()
            .collect())
    }

    async fn delete_account(&self, account_id: CspAccountId) -> AppResult<()> {
        let config_count = self
            .idp_configs
            .lock()
            .await
            .iter()
            .filter(|config| config.csp_account_id() == account_id)
            .count();
        let policy_count = self
            .policies
            .lock()
            .await
            .iter()
            .filter(|policy| policy.csp_account_id() == account_id)
            .count();
        if config_count > 0 || policy_count > 0 {
            return Err(AppError::DependentsExist(format!(
                "csp account '{account_id}' has {config_count} idp configs and {policy_count} policies"
            )));
        }

        let mut accounts = self.accounts.lock().await;
        let before = accounts.len();
        accounts.retain(|account| account.id() != account_id);
        if accounts.len() == before {
            return Err(AppError::NotFound(format!(
                "csp account '{account_id}' does not exist"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CspIdpConfigRepository for InMemoryStore {
    async fn insert_idp_config(&self, config: CspIdpConfig) -> AppResult<()> {
        self.idp_configs.lock().await.push(config);
        Ok(())
    }

    async fn update_idp_config(&self, config: CspIdpConfig) -> AppResult<()> {
        let mut configs = self.idp_configs.lock().await;
        let stored = configs
            .iter_mut()
            .find(|stored| stored.id() == config.id())
            .ok_or_else(|| AppError::NotFound(format!("idp config '{}'", config.id())))?;
        *stored = config;
        Ok(())
    }

    async fn find_idp_config(
        &self,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<Option<CspIdpConfig>> {
        Ok(self
            .idp_configs
            .lock()
            .await
            .iter()
            .find(|config| config.id() == idp_config_id)
            .cloned())
    }

    async fn idp_config_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        Ok(self.idp_configs.lock().await.iter().any(|config| {
            config.name().as_str() == name && config.csp_account_id() == csp_account_id
        }))
    }

    async fn list_idp_configs(
        &self,
        filter: &CspIdpConfigFilter,
    ) -> AppResult<Vec<CspIdpConfig>> {
        Ok(self
            .idp_configs
            .lock()
            .await
            .iter()
            .filter(|config| filter.matches(config))
            .cloned()
            .collect())
    }

    async fn delete_idp_config(&self, idp_config_id: CspIdpConfigId) -> AppResult<()> {
        let mut configs = self.idp_configs.lock().await;
        let before = configs.len();
        configs.retain(|config| config.id() != idp_config_id);
        if configs.len() == before {
            return Err(AppError::NotFound(format!(
                "idp config '{idp_config_id}' does not exist"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl CspPolicyRepository for InMemoryStore {
    async fn insert_policy(&self, policy: CspPolicy) -> AppResult<()> {
        self.policies.lock().await.push(policy);
        Ok(())
    }

    async fn update_policy(&self, policy: CspPolicy) -> AppResult<()> {
        let mut policies = self.policies.lock().await;
        let stored = policies
            .iter_mut()
            .find(|stored| stored.id() == policy.id())
            .ok_or_else(|| AppError::NotFound(format!("policy '{}'", policy.id())))?;
        *stored = policy;
        Ok(())
    }

    async fn find_policy(&self, policy_id: CspPolicyId) -> AppResult<Option<CspPolicy>> {
        Ok(self
            .policies
            .lock()
            .await
            .iter()
            .find(|policy| policy.id() == policy_id)
            .cloned())
    }

    async fn find_policy_by_provider_id(
        &self,
        csp_account_id: CspAccountId,
        provider_policy_id: &str,
    ) -> AppResult<Option<CspPolicy>> {
        Ok(self
            .policies
            .lock()
            .await
            .iter()
            .find(|policy| {
                policy.csp_account_id() == csp_account_id
                    && policy.provider_policy_id() == Some(provider_policy_id)
            })
            .cloned())
    }

    async fn policy_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        Ok(self.policies.lock().await.iter().any(|policy| {
            policy.name().as_str() == name && policy.csp_account_id() == csp_account_id
        }))
    }

    async fn list_policies(&self, filter: &CspPolicyFilter) -> AppResult<Vec<CspPolicy>> {
        Ok(self
            .policies
            .lock()
            .await
            .iter()
            .filter(|policy| filter.matches(policy))
            .cloned()
            .collect())
    }

    async fn delete_policy(&self, policy_id: CspPolicyId) -> AppResult<()> {
        let mut role_policies = self.role_policies.lock().await;
        let attachments = role_policies
            .iter()
            .filter(|(_, attached)| *attached == policy_id)
            .count();
        if attachments > 0 {
            return Err(AppError::DependentsExist(format!(
                "policy '{policy_id}' is attached to {attachments} csp roles"
            )));
        }

        let mut policies = self.policies.lock().await;
        let before = policies.len();
        policies.retain(|policy| policy.id() != policy_id);
        if policies.len() == before {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' does not exist"
            )));
        }
        role_policies.retain(|(_, attached)| *attached != policy_id);
        Ok(())
    }

    async fn attach_policy_to_role(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        let mut role_policies = self.role_policies.lock().await;
        if role_policies.contains(&(csp_role_id, policy_id)) {
            return Err(AppError::AlreadyExists(format!(
                "policy '{policy_id}' is already attached to csp role '{csp_role_id}'"
            )));
        }
        role_policies.push((csp_role_id, policy_id));
        Ok(())
    }

    async fn detach_policy_from_role(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        let mut role_policies = self.role_policies.lock().await;
        let before = role_policies.len();
        role_policies.retain(|pair| *pair != (csp_role_id, policy_id));
        if role_policies.len() == before {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' is not attached to csp role '{csp_role_id}'"
            )));
        }
        Ok(())
    }

    async fn list_policies_for_role(&self, csp_role_id: CspRoleId) -> AppResult<Vec<CspPolicy>> {
        let attached = self
            .role_policies
            .lock()
            .await
            .iter()
            .filter(|(role_id, _)| *role_id == csp_role_id)
            .map(|(_, policy_id)| *policy_id)
            .collect::<Vec<_>>();

        Ok(self
            .policies
            .lock()
            .await
            .iter()
            .filter(|policy| attached.contains(&policy.id()))
            .cloned()
            .collect())
    }

    async fn list_role_ids_for_policy(
        &self,
        policy_id: CspPolicyId,
    ) -> AppResult<Vec<CspRoleId>> {
        Ok(self
            .role_policies
            .lock()
            .await
            .iter()
            .filter(|(_, attached)| *attached == policy_id)
            .map(|(role_id, _)| *role_id)
            .collect())
    }
}

#[async_trait]
impl CspRoleRepository for InMemoryStore {
    async fn insert_csp_role(&self, role: CspRole) -> AppResult<()> {
        self.csp_roles.lock().await.push(role);
        Ok(())
    }

    async fn find_csp_role(&self, csp_role_id: CspRoleId) -> AppResult<Option<CspRole>> {
        Ok(self
            .csp_roles
            .lock()
            .await
            .iter()
            .find(|role| role.id() == csp_role_id)
            .cloned())
    }

    async fn find_csp_role_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspRole>> {
        Ok(self
            .csp_roles
            .lock()
            .await
            .iter()
            .find(|role| role.name().as_str() == name && role.csp_type() == csp_type)
            .cloned())
    }

    async fn csp_role_exists_by_name(&self, name: &str, csp_type: CspType) -> AppResult<bool> {
        Ok(self.find_csp_role_by_name(name, csp_type).await?.is_some())
    }

    async fn list_csp_roles(&self, filter: &CspRoleFilter) -> AppResult<Vec<CspRole>> {
        Ok(self
            .csp_roles
            .lock()
            .await
            .iter()
            .filter(|role| filter.matches(role))
            .cloned()
            .collect())
    }

    async fn delete_csp_role(&self, csp_role_id: CspRoleId) -> AppResult<()> {
        let mapped = self
            .mappings
            .lock()
            .await
            .iter()
            .any(|mapping| mapping.csp_role_id == csp_role_id);
        let attached = self
            .role_policies
            .lock()
            .await
            .iter()
            .any(|(role_id, _)| *role_id == csp_role_id);
        if mapped || attached {
            return Err(AppError::DependentsExist(format!(
                "csp role '{csp_role_id}' is mapped or has attached policies"
            )));
        }

        let mut roles = self.csp_roles.lock().await;
        let before = roles.len();
        roles.retain(|role| role.id() != csp_role_id);
        if roles.len() == before {
            return Err(AppError::NotFound(format!(
                "csp role '{csp_role_id}' does not exist"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleMasterRepository for InMemoryStore {
    async fn insert_role(&self, role: RoleMaster) -> AppResult<()> {
        self.roles.lock().await.push(role);
        Ok(())
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleMaster>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.id() == role_id)
            .cloned())
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleMaster>> {
        Ok(self
            .roles
            .lock()
            .await
            .iter()
            .find(|role| role.name().as_str() == name)
            .cloned())
    }

    async fn role_exists_by_name(&self, name: &str) -> AppResult<bool> {
        Ok(self.find_role_by_name(name).await?.is_some())
    }

    async fn add_role_scope(&self, role_id: RoleId, scope: RoleScope) -> AppResult<()> {
        let mut roles = self.roles.lock().await;
        let stored = roles
            .iter_mut()
            .find(|role| role.id() == role_id)
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))?;

        let mut scopes = stored.scopes().clone();
        scopes.insert(scope);
        *stored = RoleMaster::new(RoleMasterInput {
            id: stored.id(),
            parent_id: stored.parent_id(),
            name: stored.name().as_str().to_owned(),
            description: stored.description().map(str::to_owned),
            predefined: stored.predefined(),
            scopes,
        })?;
        Ok(())
    }

    async fn delete_role_cascade(&self, role_id: RoleId) -> AppResult<()> {
        self.mappings
            .lock()
            .await
            .retain(|mapping| mapping.role_id != role_id);

        let mut roles = self.roles.lock().await;
        let before = roles.len();
        roles.retain(|role| role.id() != role_id);
        if roles.len() == before {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }
        Ok(())
    }
}

#[async_trait]
impl RoleMappingRepository for InMemoryStore {
    async fn upsert_mapping(
        &self,
        input: UpsertRoleMappingInput,
    ) -> AppResult<RoleCspRoleMapping> {
        let mut mappings = self.mappings.lock().await;
        if let Some(existing) = mappings.iter_mut().find(|mapping| {
            mapping.role_id == input.role_id
                && mapping.auth_method == input.auth_method
                && mapping.csp_role_id == input.csp_role_id
        }) {
            existing.description = input.description;
            return Ok(existing.clone());
        }

        let mapping = RoleCspRoleMapping {
            role_id: input.role_id,
            auth_method: input.auth_method,
            csp_role_id: input.csp_role_id,
            description: input.description,
            created_at: Utc::now(),
        };
        mappings.push(mapping.clone());
        Ok(mapping)
    }

    async fn remove_mapping(
        &self,
        role_id: RoleId,
        csp_role_id: CspRoleId,
        auth_method: AuthMethod,
    ) -> AppResult<()> {
        let mut mappings = self.mappings.lock().await;
        let before = mappings.len();
        mappings.retain(|mapping| {
            !(mapping.role_id == role_id
                && mapping.csp_role_id == csp_role_id
                && mapping.auth_method == auth_method)
        });
        if mappings.len() == before {
            return Err(AppError::NotFound(format!(
                "mapping '{role_id}:{auth_method}:{csp_role_id}' does not exist"
            )));
        }
        Ok(())
    }

    async fn remove_all_mappings_for_role(&self, role_id: RoleId) -> AppResult<u64> {
        let mut mappings = self.mappings.lock().await;
        let before = mappings.len();
        mappings.retain(|mapping| mapping.role_id != role_id);
        Ok(u64::try_from(before - mappings.len()).unwrap_or_default())
    }

    async fn list_csp_roles_for_role(
        &self,
        role_id: RoleId,
        auth_method: AuthMethod,
    ) -> AppResult<Vec<CspRole>> {
        let csp_role_ids = self
            .mappings
            .lock()
            .await
            .iter()
            .filter(|mapping| mapping.role_id == role_id && mapping.auth_method == auth_method)
            .map(|mapping| mapping.csp_role_id)
            .collect::<Vec<_>>();

        Ok(self
            .csp_roles
            .lock()
            .await
            .iter()
            .filter(|role| csp_role_ids.contains(&role.id()))
            .cloned()
            .collect())
    }

    async fn list_mappings_for_csp_role(
        &self,
        csp_role_id: CspRoleId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        Ok(self
            .mappings
            .lock()
            .await
            .iter()
            .filter(|mapping| mapping.csp_role_id == csp_role_id)
            .cloned()
            .collect())
    }

    async fn list_mappings_for_csp_role_and_account(
        &self,
        csp_role_id: CspRoleId,
        csp_account_id: CspAccountId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        let owned = self
            .find_csp_role(csp_role_id)
            .await?
            .is_some_and(|role| role.csp_account_id() == Some(csp_account_id));
        if !owned {
            return Ok(Vec::new());
        }

        self.list_mappings_for_csp_role(csp_role_id).await
    }

    async fn list_mappings_for_role_and_csp_type(
        &self,
        role_id: RoleId,
        csp_type: CspType,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        let typed = self
            .csp_roles
            .lock()
            .await
            .iter()
            .filter(|role| role.csp_type() == csp_type)
            .map(CspRole::id)
            .collect::<Vec<_>>();

        Ok(self
            .mappings
            .lock()
            .await
            .iter()
            .filter(|mapping| mapping.role_id == role_id && typed.contains(&mapping.csp_role_id))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub(crate) struct FakeAuditRepository {
    pub(crate) events: Mutex<Vec<AuditEvent>>,
}

#[async_trait]
impl AuditRepository for FakeAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeIdentityBroker {
    pub(crate) fail: bool,
    pub(crate) calls: Mutex<u32>,
}

#[async_trait]
impl IdentityBroker for FakeIdentityBroker {
    async fn client_credentials_token(&self, _context: &CallContext) -> AppResult<BrokerToken> {
        *self.calls.lock().await += 1;
        if self.fail {
            return Err(AppError::ProviderUnavailable(
                "identity broker unreachable".to_owned(),
            ));
        }

        Ok(BrokerToken {
            access_token: "broker-access-token".to_owned(),
            token_type: "Bearer".to_owned(),
            expires_in: Some(300),
        })
    }

    async fn saml_assertion(&self, _context: &CallContext) -> AppResult<SamlAssertion> {
        *self.calls.lock().await += 1;
        if self.fail {
            return Err(AppError::ProviderUnavailable(
                "identity broker unreachable".to_owned(),
            ));
        }

        Ok(SamlAssertion {
            assertion: "PHNhbWxwOlJlc3BvbnNlLz4=".to_owned(),
        })
    }
}

pub(crate) struct PrefixSecretEncryptor;

impl SecretEncryptor for PrefixSecretEncryptor {
    fn encrypt(&self, plaintext: &str) -> AppResult<String> {
        Ok(format!("enc:{plaintext}"))
    }

    fn decrypt(&self, ciphertext: &str) -> AppResult<String> {
        ciphertext
            .strip_prefix("enc:")
            .map(str::to_owned)
            .ok_or_else(|| AppError::InvalidArgument("ciphertext is not encrypted".to_owned()))
    }
}

#[derive(Default)]
pub(crate) struct FakeProviderAdapter {
    pub(crate) web_identity_requests: Mutex<Vec<AssumeRoleWithWebIdentityRequest>>,
    pub(crate) saml_requests: Mutex<Vec<AssumeRoleWithSamlRequest>>,
    pub(crate) assume_role_requests: Mutex<Vec<AssumeRoleRequest>>,
    pub(crate) policy_pages: Mutex<Vec<PolicyPage>>,
    pub(crate) list_filters: Mutex<Vec<PolicyListFilter>>,
    pub(crate) documents: Mutex<BTreeMap<String, PolicyDocument>>,
}

impl FakeProviderAdapter {
    fn issue(duration_seconds: i32) -> IssuedCredentials {
        IssuedCredentials {
            access_key_id: "ASIATEMPORARY".to_owned(),
            secret_access_key: "temporary-secret".to_owned(),
            session_token: "temporary-session-token".to_owned(),
            expires_at: Utc::now() + Duration::seconds(i64::from(duration_seconds)),
        }
    }

    fn unsupported<T>(operation: &str) -> AppResult<T> {
        Err(AppError::Unimplemented(format!(
            "{operation} is not faked"
        )))
    }
}

#[async_trait]
impl CloudProviderAdapter for FakeProviderAdapter {
    fn csp_type(&self) -> CspType {
        CspType::Aws
    }

    async fn create_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _input: CreateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        Self::unsupported("create_role")
    }

    async fn get_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<ProviderRole> {
        Self::unsupported("get_role")
    }

    async fn update_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _input: UpdateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        Self::unsupported("update_role")
    }

    async fn delete_role(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<()> {
        Self::unsupported("delete_role")
    }

    async fn attach_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _provider_policy_id: &str,
    ) -> AppResult<()> {
        Self::unsupported("attach_role_policy")
    }

    async fn detach_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _provider_policy_id: &str,
    ) -> AppResult<()> {
        Self::unsupported("detach_role_policy")
    }

    async fn list_attached_role_policies(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<Vec<ProviderAttachedPolicy>> {
        Self::unsupported("list_attached_role_policies")
    }

    async fn list_role_policies(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
    ) -> AppResult<Vec<String>> {
        Self::unsupported("list_role_policies")
    }

    async fn get_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _policy_name: &str,
    ) -> AppResult<PolicyDocument> {
        Self::unsupported("get_role_policy")
    }

    async fn put_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _policy_name: &str,
        _document: &PolicyDocument,
    ) -> AppResult<()> {
        Self::unsupported("put_role_policy")
    }

    async fn delete_role_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _role_name: &str,
        _policy_name: &str,
    ) -> AppResult<()> {
        Self::unsupported("delete_role_policy")
    }

    async fn create_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _input: CreateProviderPolicyInput,
    ) -> AppResult<ProviderPolicy> {
        Self::unsupported("create_policy")
    }

    async fn get_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _provider_policy_id: &str,
    ) -> AppResult<ProviderPolicy> {
        Self::unsupported("get_policy")
    }

    async fn get_policy_document(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        provider_policy_id: &str,
        _version_id: Option<&str>,
    ) -> AppResult<PolicyDocument> {
        self.documents
            .lock()
            .await
            .get(provider_policy_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("policy '{provider_policy_id}'")))
    }

    async fn update_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _provider_policy_id: &str,
        _document: &PolicyDocument,
    ) -> AppResult<ProviderPolicy> {
        Self::unsupported("update_policy")
    }

    async fn delete_policy(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        _provider_policy_id: &str,
    ) -> AppResult<()> {
        Self::unsupported("delete_policy")
    }

    async fn list_policies(
        &self,
        _context: &CallContext,
        _session: &ProviderSession,
        filter: &PolicyListFilter,
    ) -> AppResult<PolicyPage> {
        self.list_filters.lock().await.push(filter.clone());

        let pages = self.policy_pages.lock().await;
        let index = match filter.marker.as_deref() {
            None => 0,
            Some(marker) => marker.parse::<usize>().unwrap_or_default(),
        };
        Ok(pages.get(index).cloned().unwrap_or_default())
    }

    async fn assume_role_with_web_identity(
        &self,
        _context: &CallContext,
        request: AssumeRoleWithWebIdentityRequest,
    ) -> AppResult<IssuedCredentials> {
        let issued = Self::issue(request.duration_seconds);
        self.web_identity_requests.lock().await.push(request);
        Ok(issued)
    }

    async fn assume_role_with_saml(
        &self,
        _context: &CallContext,
        request: AssumeRoleWithSamlRequest,
    ) -> AppResult<IssuedCredentials> {
        let issued = Self::issue(request.duration_seconds);
        self.saml_requests.lock().await.push(request);
        Ok(issued)
    }

    async fn assume_role(
        &self,
        _context: &CallContext,
        request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials> {
        let issued = Self::issue(request.duration_seconds);
        self.assume_role_requests.lock().await.push(request);
        Ok(issued)
    }

    async fn verify_caller_identity(
        &self,
        _context: &CallContext,
        session: &ProviderSession,
    ) -> AppResult<ProviderCallerIdentity> {
        let access_key_id = session
            .credentials
            .as_ref()
            .map(|credentials| credentials.access_key_id.clone());

        Ok(ProviderCallerIdentity {
            account: Some("123456789012".to_owned()),
            arn: Some("arn:aws:iam::123456789012:user/cloudtrust".to_owned()),
            user_id: access_key_id,
        })
    }
}

/// Services wired over one shared in-memory store.
pub(crate) struct Harness {
    pub(crate) store: Arc<InMemoryStore>,
    pub(crate) audit: Arc<FakeAuditRepository>,
    pub(crate) adapter: Arc<FakeProviderAdapter>,
    pub(crate) broker: Arc<FakeIdentityBroker>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_broker(FakeIdentityBroker::default())
    }

    pub(crate) fn with_broker(broker: FakeIdentityBroker) -> Self {
        Self {
            store: Arc::new(InMemoryStore::default()),
            audit: Arc::new(FakeAuditRepository::default()),
            adapter: Arc::new(FakeProviderAdapter::default()),
            broker: Arc::new(broker),
        }
    }

    pub(crate) fn trust_store(&self) -> TrustStoreService {
        TrustStoreService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.audit.clone(),
            Arc::new(PrefixSecretEncryptor),
        )
    }

    pub(crate) fn role_mapping(&self) -> RoleMappingService {
        RoleMappingService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.audit.clone(),
        )
    }

    pub(crate) fn adapters(&self) -> ProviderAdapterRegistry {
        ProviderAdapterRegistry::new().with_adapter(self.adapter.clone())
    }

    pub(crate) fn issuance(&self) -> CredentialIssuanceService {
        CredentialIssuanceService::new(
            self.store.clone(),
            self.store.clone(),
            self.role_mapping(),
            self.adapters(),
            self.broker.clone(),
            Arc::new(PrefixSecretEncryptor),
            self.audit.clone(),
        )
    }

    pub(crate) fn policy_sync(&self) -> PolicySyncService {
        PolicySyncService::new(
            self.store.clone(),
            self.store.clone(),
            self.store.clone(),
            self.issuance(),
            self.adapters(),
            self.audit.clone(),
        )
    }
}
