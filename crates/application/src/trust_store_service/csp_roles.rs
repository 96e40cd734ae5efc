use super::*;

use cloudtrust_domain::{CspRole, CspRoleId, CspRoleInput, CspType};

use crate::trust_store_ports::{CreateCspRoleInput, CspRoleFilter};

impl TrustStoreService {
    /// Registers a CSP-native role whose (name, CSP type) key is unused.
    pub async fn create_csp_role(
        &self,
        actor: &CallerIdentity,
        input: CreateCspRoleInput,
    ) -> AppResult<CspRole> {
        let role = CspRole::new(CspRoleInput {
            id: CspRoleId::new(),
            name: input.name,
            description: input.description,
            csp_type: input.csp_type,
            idp_identifier: input.idp_identifier,
            provider_role_id: input.provider_role_id,
            status: input.status,
            max_session_duration: input.max_session_duration,
            path: input.path,
            csp_account_id: input.csp_account_id,
            csp_idp_config_id: input.csp_idp_config_id,
            extended_config: input.extended_config,
        })?;

        if let Some(account_id) = role.csp_account_id() {
            self.require_account(account_id).await?;
        }
        if let Some(idp_config_id) = role.csp_idp_config_id() {
            self.get_idp_config(idp_config_id).await?;
        }

        if self
            .csp_role_repository
            .csp_role_exists_by_name(role.name().as_str(), role.csp_type())
            .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "csp role '{}' already exists for '{}'",
                role.name(),
                role.csp_type()
            )));
        }

        self.csp_role_repository
            .insert_csp_role(role.clone())
            .await?;

        self.record(
            actor,
            AuditAction::CspRoleCreated,
            "csp_role",
            role.id().to_string(),
            format!("created {} csp role '{}'", role.csp_type(), role.name()),
        )
        .await?;

        Ok(role)
    }

    /// Returns a CSP role or `NotFound`.
    pub async fn get_csp_role(&self, csp_role_id: CspRoleId) -> AppResult<CspRole> {
        self.csp_role_repository
            .find_csp_role(csp_role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("csp role '{csp_role_id}' does not exist")))
    }

    /// Finds a CSP role by its (name, CSP type) key.
    pub async fn find_csp_role_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspRole>> {
        self.csp_role_repository
            .find_csp_role_by_name(name.trim(), csp_type)
            .await
    }

    /// Lists CSP roles matching every set filter field.
    pub async fn list_csp_roles(&self, filter: &CspRoleFilter) -> AppResult<Vec<CspRole>> {
        self.csp_role_repository.list_csp_roles(filter).await
    }

    /// Deletes a CSP role that is neither mapped nor carrying attached policies.
    pub async fn delete_csp_role(
        &self,
        actor: &CallerIdentity,
        csp_role_id: CspRoleId,
    ) -> AppResult<()> {
        self.csp_role_repository
            .delete_csp_role(csp_role_id)
            .await?;

        self.record(
            actor,
            AuditAction::CspRoleDeleted,
            "csp_role",
            csp_role_id.to_string(),
            format!("deleted csp role '{csp_role_id}'"),
        )
        .await
    }
}
