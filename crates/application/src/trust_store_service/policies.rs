use super::*;

use cloudtrust_domain::{CspPolicy, CspPolicyId, CspPolicyInput, CspRole, CspRoleId};

use crate::trust_store_ports::{CreateCspPolicyInput, CspPolicyFilter, UpdateCspPolicyInput};

impl TrustStoreService {
    /// Registers a policy under an existing account.
    pub async fn create_policy(
        &self,
        actor: &CallerIdentity,
        input: CreateCspPolicyInput,
    ) -> AppResult<CspPolicy> {
        let account = self.require_account(input.csp_account_id).await?;

        let policy = CspPolicy::new(CspPolicyInput {
            id: CspPolicyId::new(),
            name: input.name,
            csp_account_id: account.id(),
            policy_type: input.policy_type,
            provider_policy_id: input.provider_policy_id,
            document: input.document,
            description: input.description,
        })?;

        if self
            .policy_repository
            .policy_exists_by_name(policy.name().as_str(), account.id())
            .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "policy '{}' already exists for account '{}'",
                policy.name(),
                account.id()
            )));
        }

        self.policy_repository.insert_policy(policy.clone()).await?;

        self.record(
            actor,
            AuditAction::CspPolicyCreated,
            "csp_policy",
            policy.id().to_string(),
            format!(
                "created {} policy '{}'",
                policy.policy_type().as_str(),
                policy.name()
            ),
        )
        .await?;

        Ok(policy)
    }

    /// Returns a policy or `NotFound`.
    pub async fn get_policy(&self, policy_id: CspPolicyId) -> AppResult<CspPolicy> {
        self.policy_repository
            .find_policy(policy_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("policy '{policy_id}' does not exist")))
    }

    /// Finds a policy in an account by its provider-side identifier.
    pub async fn find_policy_by_provider_id(
        &self,
        csp_account_id: CspAccountId,
        provider_policy_id: &str,
    ) -> AppResult<Option<CspPolicy>> {
        self.policy_repository
            .find_policy_by_provider_id(csp_account_id, provider_policy_id)
            .await
    }

    /// Lists policies matching every set filter field.
    pub async fn list_policies(&self, filter: &CspPolicyFilter) -> AppResult<Vec<CspPolicy>> {
        self.policy_repository.list_policies(filter).await
    }

    /// Applies a partial update.
    pub async fn update_policy(
        &self,
        actor: &CallerIdentity,
        policy_id: CspPolicyId,
        input: UpdateCspPolicyInput,
    ) -> AppResult<CspPolicy> {
        let current = self.get_policy(policy_id).await?;

        let updated = CspPolicy::new(CspPolicyInput {
            id: current.id(),
            name: input
                .name
                .unwrap_or_else(|| current.name().as_str().to_owned()),
            csp_account_id: current.csp_account_id(),
            policy_type: input.policy_type.unwrap_or_else(|| current.policy_type()),
            provider_policy_id: input
                .provider_policy_id
                .or_else(|| current.provider_policy_id().map(str::to_owned)),
            document: input
                .document
                .unwrap_or_else(|| current.document().clone()),
            description: input
                .description
                .or_else(|| current.description().map(str::to_owned)),
        })?;

        if updated.name() != current.name()
            && self
                .policy_repository
                .policy_exists_by_name(updated.name().as_str(), updated.csp_account_id())
                .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "policy '{}' already exists for account '{}'",
                updated.name(),
                updated.csp_account_id()
            )));
        }

        self.policy_repository
            .update_policy(updated.clone())
            .await?;

        self.record(
            actor,
            AuditAction::CspPolicyUpdated,
            "csp_policy",
            policy_id.to_string(),
            format!("updated policy '{}'", updated.name()),
        )
        .await?;

        Ok(updated)
    }

    /// Deletes a policy that is not attached to any CSP role.
    pub async fn delete_policy(
        &self,
        actor: &CallerIdentity,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        self.policy_repository.delete_policy(policy_id).await?;

        self.record(
            actor,
            AuditAction::CspPolicyDeleted,
            "csp_policy",
            policy_id.to_string(),
            format!("deleted policy '{policy_id}'"),
        )
        .await
    }

    /// Attaches a policy to a CSP role. Re-attaching is `AlreadyExists`.
    pub async fn attach_policy_to_role(
        &self,
        actor: &CallerIdentity,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        let csp_role = self.get_csp_role(csp_role_id).await?;
        let policy = self.get_policy(policy_id).await?;

        self.policy_repository
            .attach_policy_to_role(csp_role_id, policy_id)
            .await?;

        self.record(
            actor,
            AuditAction::CspPolicyAttached,
            "csp_role_policy",
            format!("{csp_role_id}:{policy_id}"),
            format!(
                "attached policy '{}' to csp role '{}'",
                policy.name(),
                csp_role.name()
            ),
        )
        .await
    }

    /// Detaches a policy from a CSP role, returning `NotFound` when not attached.
    pub async fn detach_policy_from_role(
        &self,
        actor: &CallerIdentity,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        self.policy_repository
            .detach_policy_from_role(csp_role_id, policy_id)
            .await?;

        self.record(
            actor,
            AuditAction::CspPolicyDetached,
            "csp_role_policy",
            format!("{csp_role_id}:{policy_id}"),
            format!("detached policy '{policy_id}' from csp role '{csp_role_id}'"),
        )
        .await
    }

    /// Lists policies attached to a CSP role.
    pub async fn list_policies_for_role(&self, csp_role_id: CspRoleId) -> AppResult<Vec<CspPolicy>> {
        self.get_csp_role(csp_role_id).await?;
        self.policy_repository
            .list_policies_for_role(csp_role_id)
            .await
    }

    /// Lists CSP roles a policy is attached to.
    pub async fn list_roles_for_policy(&self, policy_id: CspPolicyId) -> AppResult<Vec<CspRole>> {
        self.get_policy(policy_id).await?;

        let mut roles = Vec::new();
        for csp_role_id in self
            .policy_repository
            .list_role_ids_for_policy(policy_id)
            .await?
        {
            if let Some(role) = self.csp_role_repository.find_csp_role(csp_role_id).await? {
                roles.push(role);
            }
        }

        Ok(roles)
    }

    /// Returns whether the (name, account) key is taken.
    pub async fn policy_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        self.policy_repository
            .policy_exists_by_name(name.trim(), csp_account_id)
            .await
    }
}
