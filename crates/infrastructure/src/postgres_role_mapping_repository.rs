//! PostgreSQL-backed role masters and role to CSP role mapping graph.

use std::collections::BTreeSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use cloudtrust_application::{
    RoleMappingRepository, RoleMasterRepository, UpsertRoleMappingInput,
};
use cloudtrust_core::{AppError, AppResult};
use cloudtrust_domain::{
    AuthMethod, CspAccountId, CspRole, CspRoleId, CspType, RoleCspRoleMapping, RoleId,
    RoleMaster, RoleMasterInput, RoleScope,
};

use crate::postgres_trust_store_repository::{CSP_ROLE_COLUMNS, CspRoleRow};

/// PostgreSQL implementation of the role master and role mapping ports.
#[derive(Clone)]
pub struct PostgresRoleMappingRepository {
    pool: PgPool,
}

impl PostgresRoleMappingRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct RoleRow {
    id: Uuid,
    parent_id: Option<Uuid>,
    name: String,
    description: Option<String>,
    predefined: bool,
    scope: Option<String>,
}

#[derive(Debug, FromRow)]
struct MappingRow {
    role_id: Uuid,
    auth_method: String,
    csp_role_id: Uuid,
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<MappingRow> for RoleCspRoleMapping {
    type Error = AppError;

    fn try_from(row: MappingRow) -> AppResult<Self> {
        Ok(Self {
            role_id: RoleId::from_uuid(row.role_id),
            auth_method: AuthMethod::from_str(row.auth_method.as_str())?,
            csp_role_id: CspRoleId::from_uuid(row.csp_role_id),
            description: row.description,
            created_at: row.created_at,
        })
    }
}

/// Folds one row per (role, scope) into role masters, preserving row order.
fn aggregate_roles(rows: Vec<RoleRow>) -> AppResult<Vec<RoleMaster>> {
    let mut grouped: Vec<(RoleRow, BTreeSet<RoleScope>)> = Vec::new();

    for row in rows {
        let scope = row
            .scope
            .as_deref()
            .map(RoleScope::from_str)
            .transpose()?;

        match grouped.last_mut() {
            Some((current, scopes)) if current.id == row.id => {
                scopes.extend(scope);
            }
            _ => grouped.push((row, scope.into_iter().collect())),
        }
    }

    grouped
        .into_iter()
        .map(|(row, scopes)| {
            RoleMaster::new(RoleMasterInput {
                id: RoleId::from_uuid(row.id),
                parent_id: row.parent_id.map(RoleId::from_uuid),
                name: row.name,
                description: row.description,
                predefined: row.predefined,
                scopes,
            })
        })
        .collect()
}

const MAPPING_COLUMNS: &str = r#"
    mappings.role_id,
    mappings.auth_method,
    mappings.csp_role_id,
    mappings.description,
    mappings.created_at
"#;

mod mappings;
mod roles;

#[async_trait]
impl RoleMasterRepository for PostgresRoleMappingRepository {
    async fn insert_role(&self, role: RoleMaster) -> AppResult<()> {
        self.insert_role_impl(role).await
    }

    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleMaster>> {
        self.find_role_impl(role_id).await
    }

    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleMaster>> {
        self.find_role_by_name_impl(name).await
    }

    async fn role_exists_by_name(&self, name: &str) -> AppResult<bool> {
        Ok(self.find_role_by_name_impl(name).await?.is_some())
    }

    async fn add_role_scope(&self, role_id: RoleId, scope: RoleScope) -> AppResult<()> {
        self.add_role_scope_impl(role_id, scope).await
    }

    async fn delete_role_cascade(&self, role_id: RoleId) -> AppResult<()> {
        self.delete_role_cascade_impl(role_id).await
    }
}

#[async_trait]
impl RoleMappingRepository for PostgresRoleMappingRepository {
    async fn upsert_mapping(
        &self,
        input: UpsertRoleMappingInput,
    ) -> AppResult<RoleCspRoleMapping> {
        self.upsert_mapping_impl(input).await
    }

    async fn remove_mapping(
        &self,
        role_id: RoleId,
        csp_role_id: CspRoleId,
        auth_method: AuthMethod,
    ) -> AppResult<()> {
        self.remove_mapping_impl(role_id, csp_role_id, auth_method)
            .await
    }

    async fn remove_all_mappings_for_role(&self, role_id: RoleId) -> AppResult<u64> {
        self.remove_all_mappings_for_role_impl(role_id).await
    }

    async fn list_csp_roles_for_role(
        &self,
        role_id: RoleId,
        auth_method: AuthMethod,
    ) -> AppResult<Vec<CspRole>> {
        self.list_csp_roles_for_role_impl(role_id, auth_method)
            .await
    }

    async fn list_mappings_for_csp_role(
        &self,
        csp_role_id: CspRoleId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        self.list_mappings_for_csp_role_impl(csp_role_id).await
    }

    async fn list_mappings_for_csp_role_and_account(
        &self,
        csp_role_id: CspRoleId,
        csp_account_id: CspAccountId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        self.list_mappings_for_csp_role_and_account_impl(csp_role_id, csp_account_id)
            .await
    }

    async fn list_mappings_for_role_and_csp_type(
        &self,
        role_id: RoleId,
        csp_type: CspType,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        self.list_mappings_for_role_and_csp_type_impl(role_id, csp_type)
            .await
    }
}

#[cfg(test)]
mod tests;
