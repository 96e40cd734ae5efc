use super::*;

impl RoleMappingService {
    /// Returns the CSP roles a role may federate into under a trust method.
    ///
    /// An empty result is valid and means no mapping exists for the method.
    pub async fn resolve(&self, role_id: RoleId, auth_method: AuthMethod) -> AppResult<Vec<CspRole>> {
        self.get_role(role_id).await?;
        self.mapping_repository
            .list_csp_roles_for_role(role_id, auth_method)
            .await
    }

    /// Lists the edges pointing at a CSP role.
    pub async fn resolve_by_csp_role(
        &self,
        csp_role_id: CspRoleId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        self.mapping_repository
            .list_mappings_for_csp_role(csp_role_id)
            .await
    }

    /// Lists the edges pointing at a CSP role owned by an account.
    pub async fn resolve_by_csp_role_and_account(
        &self,
        csp_role_id: CspRoleId,
        csp_account_id: CspAccountId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        self.mapping_repository
            .list_mappings_for_csp_role_and_account(csp_role_id, csp_account_id)
            .await
    }

    /// Lists a role's edges into CSP roles of one provider.
    pub async fn resolve_by_csp_type(
        &self,
        role_id: RoleId,
        csp_type: CspType,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        self.mapping_repository
            .list_mappings_for_role_and_csp_type(role_id, csp_type)
            .await
    }

    /// Adds an edge, or updates only the description of an existing one.
    pub async fn upsert_mapping(
        &self,
        actor: &CallerIdentity,
        input: UpsertRoleMappingInput,
    ) -> AppResult<RoleCspRoleMapping> {
        self.get_role(input.role_id).await?.ensure_csp_mappable()?;

        if self
            .csp_role_repository
            .find_csp_role(input.csp_role_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(format!(
                "csp role '{}' does not exist",
                input.csp_role_id
            )));
        }

        let mapping = self.mapping_repository.upsert_mapping(input).await?;

        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                AuditAction::RoleMappingUpserted,
                "role_csp_role_mapping",
                mapping_key(mapping.role_id, mapping.auth_method, mapping.csp_role_id),
                mapping.description.clone(),
            ))
            .await?;

        info!(
            role_id = %mapping.role_id,
            csp_role_id = %mapping.csp_role_id,
            auth_method = %mapping.auth_method,
            "role mapping upserted"
        );
        Ok(mapping)
    }

    /// Removes one edge, returning `NotFound` when it does not exist.
    pub async fn remove_mapping(
        &self,
        actor: &CallerIdentity,
        role_id: RoleId,
        csp_role_id: CspRoleId,
        auth_method: AuthMethod,
    ) -> AppResult<()> {
        self.mapping_repository
            .remove_mapping(role_id, csp_role_id, auth_method)
            .await?;

        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                AuditAction::RoleMappingRemoved,
                "role_csp_role_mapping",
                mapping_key(role_id, auth_method, csp_role_id),
                None,
            ))
            .await?;

        info!(
            role_id = %role_id,
            csp_role_id = %csp_role_id,
            auth_method = %auth_method,
            "role mapping removed"
        );
        Ok(())
    }

    /// Removes every edge of a role and returns how many were removed.
    pub async fn remove_all_mappings_for_role(
        &self,
        actor: &CallerIdentity,
        role_id: RoleId,
    ) -> AppResult<u64> {
        let removed = self
            .mapping_repository
            .remove_all_mappings_for_role(role_id)
            .await?;

        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                AuditAction::RoleMappingRemoved,
                "role",
                role_id.to_string(),
                Some(format!("removed {removed} role mappings")),
            ))
            .await?;

        info!(role_id = %role_id, removed, "role mappings cleared");
        Ok(removed)
    }
}

fn mapping_key(role_id: RoleId, auth_method: AuthMethod, csp_role_id: CspRoleId) -> String {
    format!("{role_id}:{}:{csp_role_id}", auth_method.as_str())
}
