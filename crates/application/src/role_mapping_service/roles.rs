use super::*;

impl RoleMappingService {
    /// Creates a role master with its scope subs.
    pub async fn create_role(
        &self,
        actor: &CallerIdentity,
        input: CreateRoleMasterInput,
    ) -> AppResult<RoleMaster> {
        let role = RoleMaster::new(RoleMasterInput {
            id: RoleId::new(),
            parent_id: input.parent_id,
            name: input.name,
            description: input.description,
            predefined: input.predefined,
            scopes: input.scopes,
        })?;

        if let Some(parent_id) = role.parent_id() {
            self.get_role(parent_id).await?;
        }

        if self
            .role_repository
            .role_exists_by_name(role.name().as_str())
            .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "role '{}' already exists",
                role.name()
            )));
        }

        self.role_repository.insert_role(role.clone()).await?;

        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                AuditAction::RoleCreated,
                "role_master",
                role.id().to_string(),
                Some(format!("created role '{}'", role.name())),
            ))
            .await?;

        info!(role_id = %role.id(), role = %role.name(), "role master created");
        Ok(role)
    }

    /// Returns a role or `NotFound`.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<RoleMaster> {
        self.role_repository
            .find_role(role_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
    }

    /// Finds a role by its unique name.
    pub async fn find_role_by_name(&self, name: &str) -> AppResult<Option<RoleMaster>> {
        self.role_repository.find_role_by_name(name.trim()).await
    }

    /// Returns the role a selector points at, or `NotFound`.
    pub async fn role_for_selector(&self, selector: &RoleSelector) -> AppResult<RoleMaster> {
        match selector {
            RoleSelector::Id(role_id) => self.get_role(*role_id).await,
            RoleSelector::Name(name) => self
                .find_role_by_name(name)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("role '{name}' does not exist"))),
        }
    }

    /// Adds a scope sub to a role.
    pub async fn add_role_scope(&self, role_id: RoleId, scope: RoleScope) -> AppResult<RoleMaster> {
        let role = self.get_role(role_id).await?;
        if !role.has_scope(scope) {
            self.role_repository.add_role_scope(role_id, scope).await?;
        }

        self.get_role(role_id).await
    }

    /// Deletes a role after removing its mappings and subs.
    pub async fn delete_role(&self, actor: &CallerIdentity, role_id: RoleId) -> AppResult<()> {
        let role = self.get_role(role_id).await?;
        self.role_repository.delete_role_cascade(role_id).await?;

        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                AuditAction::RoleDeleted,
                "role_master",
                role_id.to_string(),
                Some(format!("deleted role '{}'", role.name())),
            ))
            .await?;

        info!(role_id = %role_id, "role master deleted");
        Ok(())
    }
}
