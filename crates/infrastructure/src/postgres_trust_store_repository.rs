//! PostgreSQL-backed trust configuration store.

use std::str::FromStr;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use cloudtrust_application::{
    CspAccountFilter, CspAccountRepository, CspIdpConfigFilter, CspIdpConfigRepository,
    CspPolicyFilter, CspPolicyRepository, CspRoleFilter, CspRoleRepository,
};
use cloudtrust_core::{AppError, AppResult};
use cloudtrust_domain::{
    AccountDescriptors, AuthMethod, CspAccount, CspAccountId, CspAccountInput, CspIdpConfig,
    CspIdpConfigId, CspIdpConfigInput, CspPolicy, CspPolicyId, CspPolicyInput, CspRole,
    CspRoleId, CspRoleInput, CspType, PolicyDocument, PolicyType, TrustConfigEntries,
};

/// PostgreSQL implementation of the account, IdP config, policy and CSP role ports.
#[derive(Clone)]
pub struct PostgresTrustStoreRepository {
    pool: PgPool,
}

impl PostgresTrustStoreRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    name: String,
    csp_type: String,
    descriptors: Json<AccountDescriptors>,
    description: Option<String>,
    is_active: bool,
}

impl TryFrom<AccountRow> for CspAccount {
    type Error = AppError;

    fn try_from(row: AccountRow) -> AppResult<Self> {
        CspAccount::new(CspAccountInput {
            id: CspAccountId::from_uuid(row.id),
            name: row.name,
            csp_type: CspType::from_str(row.csp_type.as_str())?,
            descriptors: row.descriptors.0,
            description: row.description,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, FromRow)]
struct IdpConfigRow {
    id: Uuid,
    name: String,
    csp_account_id: Uuid,
    csp_type: String,
    auth_method: String,
    config: Json<TrustConfigEntries>,
    description: Option<String>,
    is_active: bool,
}

impl TryFrom<IdpConfigRow> for CspIdpConfig {
    type Error = AppError;

    fn try_from(row: IdpConfigRow) -> AppResult<Self> {
        CspIdpConfig::new(CspIdpConfigInput {
            id: CspIdpConfigId::from_uuid(row.id),
            name: row.name,
            csp_account_id: CspAccountId::from_uuid(row.csp_account_id),
            csp_type: CspType::from_str(row.csp_type.as_str())?,
            auth_method: AuthMethod::from_str(row.auth_method.as_str())?,
            config: row.config.0,
            description: row.description,
            is_active: row.is_active,
        })
    }
}

#[derive(Debug, FromRow)]
struct PolicyRow {
    id: Uuid,
    name: String,
    csp_account_id: Uuid,
    policy_type: String,
    provider_policy_id: Option<String>,
    document: Json<PolicyDocument>,
    description: Option<String>,
}

impl TryFrom<PolicyRow> for CspPolicy {
    type Error = AppError;

    fn try_from(row: PolicyRow) -> AppResult<Self> {
        CspPolicy::new(CspPolicyInput {
            id: CspPolicyId::from_uuid(row.id),
            name: row.name,
            csp_account_id: CspAccountId::from_uuid(row.csp_account_id),
            policy_type: PolicyType::from_str(row.policy_type.as_str())?,
            provider_policy_id: row.provider_policy_id,
            document: row.document.0,
            description: row.description,
        })
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct CspRoleRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    csp_type: String,
    idp_identifier: Option<String>,
    provider_role_id: Option<String>,
    status: String,
    max_session_duration: Option<i32>,
    path: Option<String>,
    csp_account_id: Option<Uuid>,
    csp_idp_config_id: Option<Uuid>,
    extended_config: Json<Map<String, Value>>,
}

impl TryFrom<CspRoleRow> for CspRole {
    type Error = AppError;

    fn try_from(row: CspRoleRow) -> AppResult<Self> {
        CspRole::new(CspRoleInput {
            id: CspRoleId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            csp_type: CspType::from_str(row.csp_type.as_str())?,
            idp_identifier: row.idp_identifier,
            provider_role_id: row.provider_role_id,
            status: Some(row.status),
            max_session_duration: row.max_session_duration,
            path: row.path,
            csp_account_id: row.csp_account_id.map(CspAccountId::from_uuid),
            csp_idp_config_id: row.csp_idp_config_id.map(CspIdpConfigId::from_uuid),
            extended_config: row.extended_config.0,
        })
    }
}

pub(crate) const CSP_ROLE_COLUMNS: &str = r#"
    csp_roles.id,
    csp_roles.name,
    csp_roles.description,
    csp_roles.csp_type,
    csp_roles.idp_identifier,
    csp_roles.provider_role_id,
    csp_roles.status,
    csp_roles.max_session_duration,
    csp_roles.path,
    csp_roles.csp_account_id,
    csp_roles.csp_idp_config_id,
    csp_roles.extended_config
"#;

fn map_unique_violation(error: sqlx::Error, conflict: impl FnOnce() -> String) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::AlreadyExists(conflict());
    }

    AppError::Internal(format!("failed to persist trust store record: {error}"))
}

fn map_delete_error(
    error: sqlx::Error,
    record: &str,
    dependents: impl FnOnce() -> String,
) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23503")
    {
        return AppError::DependentsExist(dependents());
    }

    AppError::Internal(format!("failed to delete {record}: {error}"))
}

fn push_name_filter(builder: &mut QueryBuilder<'_, Postgres>, column: &str, needle: Option<&str>) {
    if let Some(needle) = needle {
        builder.push(format!(" AND strpos(lower({column}), lower("));
        builder.push_bind(needle.to_owned());
        builder.push(")) > 0");
    }
}

mod accounts;
mod csp_roles;
mod idp_configs;
mod policies;

#[async_trait]
impl CspAccountRepository for PostgresTrustStoreRepository {
    async fn insert_account(&self, account: CspAccount) -> AppResult<()> {
        self.insert_account_impl(account).await
    }

    async fn update_account(&self, account: CspAccount) -> AppResult<()> {
        self.update_account_impl(account).await
    }

    async fn find_account(&self, account_id: CspAccountId) -> AppResult<Option<CspAccount>> {
        self.find_account_impl(account_id).await
    }

    async fn find_account_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspAccount>> {
        self.find_account_by_name_impl(name, csp_type).await
    }

    async fn account_exists(&self, account_id: CspAccountId) -> AppResult<bool> {
        self.account_exists_impl(account_id).await
    }

    async fn account_exists_by_name(&self, name: &str, csp_type: CspType) -> AppResult<bool> {
        Ok(self.find_account_by_name_impl(name, csp_type).await?.is_some())
    }

    async fn list_accounts(&self, filter: &CspAccountFilter) -> AppResult<Vec<CspAccount>> {
        self.list_accounts_impl(filter).await
    }

    async fn delete_account(&self, account_id: CspAccountId) -> AppResult<()> {
        self.delete_account_impl(account_id).await
    }
}

#[async_trait]
impl CspIdpConfigRepository for PostgresTrustStoreRepository {
    async fn insert_idp_config(&self, config: CspIdpConfig) -> AppResult<()> {
        self.insert_idp_config_impl(config).await
    }

    async fn update_idp_config(&self, config: CspIdpConfig) -> AppResult<()> {
        self.update_idp_config_impl(config).await
    }

    async fn find_idp_config(
        &self,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<Option<CspIdpConfig>> {
        self.find_idp_config_impl(idp_config_id).await
    }

    async fn idp_config_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        self.idp_config_exists_by_name_impl(name, csp_account_id)
            .await
    }

    async fn list_idp_configs(
        &self,
        filter: &CspIdpConfigFilter,
    ) -> AppResult<Vec<CspIdpConfig>> {
        self.list_idp_configs_impl(filter).await
    }

    async fn delete_idp_config(&self, idp_config_id: CspIdpConfigId) -> AppResult<()> {
        self.delete_idp_config_impl(idp_config_id).await
    }
}

#[async_trait]
impl CspPolicyRepository for PostgresTrustStoreRepository {
    async fn insert_policy(&self, policy: CspPolicy) -> AppResult<()> {
        self.insert_policy_impl(policy).await
    }

    async fn update_policy(&self, policy: CspPolicy) -> AppResult<()> {
        self.update_policy_impl(policy).await
    }

    async fn find_policy(&self, policy_id: CspPolicyId) -> AppResult<Option<CspPolicy>> {
        self.find_policy_impl(policy_id).await
    }

    async fn find_policy_by_provider_id(
        &self,
        csp_account_id: CspAccountId,
        provider_policy_id: &str,
    ) -> AppResult<Option<CspPolicy>> {
        self.find_policy_by_provider_id_impl(csp_account_id, provider_policy_id)
            .await
    }

    async fn policy_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        self.policy_exists_by_name_impl(name, csp_account_id).await
    }

    async fn list_policies(&self, filter: &CspPolicyFilter) -> AppResult<Vec<CspPolicy>> {
        self.list_policies_impl(filter).await
    }

    async fn delete_policy(&self, policy_id: CspPolicyId) -> AppResult<()> {
        self.delete_policy_impl(policy_id).await
    }

    async fn attach_policy_to_role(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        self.attach_policy_to_role_impl(csp_role_id, policy_id)
            .await
    }

    async fn detach_policy_from_role(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        self.detach_policy_from_role_impl(csp_role_id, policy_id)
            .await
    }

    async fn list_policies_for_role(&self, csp_role_id: CspRoleId) -> AppResult<Vec<CspPolicy>> {
        self.list_policies_for_role_impl(csp_role_id).await
    }

    async fn list_role_ids_for_policy(
        &self,
        policy_id: CspPolicyId,
    ) -> AppResult<Vec<CspRoleId>> {
        self.list_role_ids_for_policy_impl(policy_id).await
    }
}

#[async_trait]
impl CspRoleRepository for PostgresTrustStoreRepository {
    async fn insert_csp_role(&self, role: CspRole) -> AppResult<()> {
        self.insert_csp_role_impl(role).await
    }

    async fn find_csp_role(&self, csp_role_id: CspRoleId) -> AppResult<Option<CspRole>> {
        self.find_csp_role_impl(csp_role_id).await
    }

    async fn find_csp_role_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspRole>> {
        self.find_csp_role_by_name_impl(name, csp_type).await
    }

    async fn csp_role_exists_by_name(&self, name: &str, csp_type: CspType) -> AppResult<bool> {
        Ok(self
            .find_csp_role_by_name_impl(name, csp_type)
            .await?
            .is_some())
    }

    async fn list_csp_roles(&self, filter: &CspRoleFilter) -> AppResult<Vec<CspRole>> {
        self.list_csp_roles_impl(filter).await
    }

    async fn delete_csp_role(&self, csp_role_id: CspRoleId) -> AppResult<()> {
        self.delete_csp_role_impl(csp_role_id).await
    }
}
