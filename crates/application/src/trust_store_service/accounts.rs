use super::*;

use cloudtrust_domain::{CspAccountInput, CspType};

use crate::trust_store_ports::{CreateCspAccountInput, CspAccountFilter, UpdateCspAccountInput};

impl TrustStoreService {
    /// Registers a CSP account whose (name, CSP type) key is unused.
    pub async fn create_account(
        &self,
        actor: &CallerIdentity,
        input: CreateCspAccountInput,
    ) -> AppResult<CspAccount> {
        let account = CspAccount::new(CspAccountInput {
            id: CspAccountId::new(),
            name: input.name,
            csp_type: input.csp_type,
            descriptors: input.descriptors,
            description: input.description,
            is_active: input.is_active,
        })?;

        if self
            .account_repository
            .account_exists_by_name(account.name().as_str(), account.csp_type())
            .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "csp account '{}' already exists for '{}'",
                account.name(),
                account.csp_type()
            )));
        }

        self.account_repository
            .insert_account(account.clone())
            .await?;

        self.record(
            actor,
            AuditAction::CspAccountCreated,
            "csp_account",
            account.id().to_string(),
            format!(
                "created {} account '{}'",
                account.csp_type(),
                account.name()
            ),
        )
        .await?;

        Ok(account)
    }

    /// Returns an account or `NotFound`.
    pub async fn get_account(&self, account_id: CspAccountId) -> AppResult<CspAccount> {
        self.require_account(account_id).await
    }

    /// Returns an account when it exists.
    pub async fn find_account(&self, account_id: CspAccountId) -> AppResult<Option<CspAccount>> {
        self.account_repository.find_account(account_id).await
    }

    /// Finds an account by its (name, CSP type) key.
    pub async fn find_account_by_name(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspAccount>> {
        self.account_repository
            .find_account_by_name(name.trim(), csp_type)
            .await
    }

    /// Lists accounts matching every set filter field.
    pub async fn list_accounts(&self, filter: &CspAccountFilter) -> AppResult<Vec<CspAccount>> {
        self.account_repository.list_accounts(filter).await
    }

    /// Applies a partial update. The CSP type of an account never changes.
    pub async fn update_account(
        &self,
        actor: &CallerIdentity,
        account_id: CspAccountId,
        input: UpdateCspAccountInput,
    ) -> AppResult<CspAccount> {
        let current = self.require_account(account_id).await?;

        let updated = CspAccount::new(CspAccountInput {
            id: current.id(),
            name: input
                .name
                .unwrap_or_else(|| current.name().as_str().to_owned()),
            csp_type: current.csp_type(),
            descriptors: input
                .descriptors
                .unwrap_or_else(|| current.descriptors().clone()),
            description: input
                .description
                .or_else(|| current.description().map(str::to_owned)),
            is_active: current.is_active(),
        })?;

        if updated.name() != current.name()
            && self
                .account_repository
                .account_exists_by_name(updated.name().as_str(), updated.csp_type())
                .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "csp account '{}' already exists for '{}'",
                updated.name(),
                updated.csp_type()
            )));
        }

        self.account_repository
            .update_account(updated.clone())
            .await?;

        self.record(
            actor,
            AuditAction::CspAccountUpdated,
            "csp_account",
            account_id.to_string(),
            format!("updated account '{}'", updated.name()),
        )
        .await?;

        Ok(updated)
    }

    /// Activates or deactivates an account.
    pub async fn set_account_active(
        &self,
        actor: &CallerIdentity,
        account_id: CspAccountId,
        is_active: bool,
    ) -> AppResult<CspAccount> {
        let account = self
            .require_account(account_id)
            .await?
            .with_active(is_active);

        self.account_repository
            .update_account(account.clone())
            .await?;

        self.record(
            actor,
            AuditAction::CspAccountUpdated,
            "csp_account",
            account_id.to_string(),
            format!(
                "{} account '{}'",
                if is_active { "activated" } else { "deactivated" },
                account.name()
            ),
        )
        .await?;

        Ok(account)
    }

    /// Checks that an account carries the descriptors its provider requires.
    pub async fn validate_account(&self, account_id: CspAccountId) -> AppResult<()> {
        self.require_account(account_id)
            .await?
            .validate_descriptors()
    }

    /// Deletes an account unless IdP configs or policies still reference it.
    pub async fn delete_account(
        &self,
        actor: &CallerIdentity,
        account_id: CspAccountId,
    ) -> AppResult<()> {
        self.account_repository.delete_account(account_id).await?;

        self.record(
            actor,
            AuditAction::CspAccountDeleted,
            "csp_account",
            account_id.to_string(),
            format!("deleted account '{account_id}'"),
        )
        .await
    }

    /// Returns whether an account exists.
    pub async fn account_exists(&self, account_id: CspAccountId) -> AppResult<bool> {
        self.account_repository.account_exists(account_id).await
    }

    /// Returns whether the (name, CSP type) key is taken.
    pub async fn account_exists_by_name_and_type(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<bool> {
        self.account_repository
            .account_exists_by_name(name.trim(), csp_type)
            .await
    }
}
