use async_trait::async_trait;

use cloudtrust_core::AppResult;
use cloudtrust_domain::{
    AuthMethod, CspAccountId, CspRole, CspRoleId, CspType, RoleCspRoleMapping, RoleId, RoleMaster,
    RoleScope,
};

use super::inputs::UpsertRoleMappingInput;

/// Repository port for role masters and their scope subs.
#[async_trait]
pub trait RoleMasterRepository: Send + Sync {
    /// Inserts a role together with one sub row per scope.
    async fn insert_role(&self, role: RoleMaster) -> AppResult<()>;

    /// Finds a role by id.
    async fn find_role(&self, role_id: RoleId) -> AppResult<Option<RoleMaster>>;

    /// Finds a role by its unique name.
    async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleMaster>>;

    /// Returns whether a role name is taken.
    async fn role_exists_by_name(&self, name: &str) -> AppResult<bool>;

    /// Adds a scope sub to a role; adding an existing scope is a no-op.
    async fn add_role_scope(&self, role_id: RoleId, scope: RoleScope) -> AppResult<()>;

    /// Removes the role's mappings, then its subs, then the role, in one transaction.
    async fn delete_role_cascade(&self, role_id: RoleId) -> AppResult<()>;
}

/// Repository port for the role to CSP role mapping graph.
#[async_trait]
pub trait RoleMappingRepository: Send + Sync {
    /// Inserts an edge or updates the description of an existing one.
    ///
    /// The role's csp sub, the CSP role's existence and the write run in one
    /// transaction.
    async fn upsert_mapping(&self, input: UpsertRoleMappingInput) -> AppResult<RoleCspRoleMapping>;

    /// Removes one edge, returning `NotFound` when it does not exist.
    async fn remove_mapping(
        &self,
        role_id: RoleId,
        csp_role_id: CspRoleId,
        auth_method: AuthMethod,
    ) -> AppResult<()>;

    /// Removes every edge of a role and returns the number removed.
    async fn remove_all_mappings_for_role(&self, role_id: RoleId) -> AppResult<u64>;

    /// Lists CSP roles mapped to a role under a trust method.
    async fn list_csp_roles_for_role(
        &self,
        role_id: RoleId,
        auth_method: AuthMethod,
    ) -> AppResult<Vec<CspRole>>;

    /// Lists edges pointing at a CSP role.
    async fn list_mappings_for_csp_role(
        &self,
        csp_role_id: CspRoleId,
    ) -> AppResult<Vec<RoleCspRoleMapping>>;

    /// Lists edges pointing at a CSP role owned by the given account.
    async fn list_mappings_for_csp_role_and_account(
        &self,
        csp_role_id: CspRoleId,
        csp_account_id: CspAccountId,
    ) -> AppResult<Vec<RoleCspRoleMapping>>;

    /// Lists edges of a role whose CSP role belongs to the given provider.
    async fn list_mappings_for_role_and_csp_type(
        &self,
        role_id: RoleId,
        csp_type: CspType,
    ) -> AppResult<Vec<RoleCspRoleMapping>>;
}
