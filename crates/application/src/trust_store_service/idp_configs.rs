use super::*;

use cloudtrust_domain::{CspIdpConfig, CspIdpConfigId, CspIdpConfigInput};

use crate::trust_store_ports::{
    CreateCspIdpConfigInput, CspIdpConfigFilter, UpdateCspIdpConfigInput,
};

impl TrustStoreService {
    /// Registers an IdP trust configuration under an existing account.
    ///
    /// The configuration keys are validated against the account's CSP type. A plaintext
    /// static secret is encrypted before it is stored.
    pub async fn create_idp_config(
        &self,
        actor: &CallerIdentity,
        input: CreateCspIdpConfigInput,
    ) -> AppResult<CspIdpConfig> {
        let account = self.require_account(input.csp_account_id).await?;

        if self
            .idp_config_repository
            .idp_config_exists_by_name(input.name.trim(), account.id())
            .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "idp config '{}' already exists for account '{}'",
                input.name.trim(),
                account.id()
            )));
        }

        let config = CspIdpConfig::new(CspIdpConfigInput {
            id: CspIdpConfigId::new(),
            name: input.name,
            csp_account_id: account.id(),
            csp_type: account.csp_type(),
            auth_method: input.auth_method,
            config: input.config,
            description: input.description,
            is_active: input.is_active,
        })?
        .seal_secret(|plaintext| self.secret_encryptor.encrypt(plaintext))?;

        self.idp_config_repository
            .insert_idp_config(config.clone())
            .await?;

        self.record(
            actor,
            AuditAction::IdpConfigCreated,
            "csp_idp_config",
            config.id().to_string(),
            format!(
                "created {} idp config '{}' for account '{}'",
                config.auth_method(),
                config.name(),
                account.name()
            ),
        )
        .await?;

        Ok(config)
    }

    /// Returns a configuration or `NotFound`.
    pub async fn get_idp_config(&self, idp_config_id: CspIdpConfigId) -> AppResult<CspIdpConfig> {
        self.idp_config_repository
            .find_idp_config(idp_config_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("idp config '{idp_config_id}' does not exist"))
            })
    }

    /// Lists configurations matching every set filter field.
    pub async fn list_idp_configs(
        &self,
        filter: &CspIdpConfigFilter,
    ) -> AppResult<Vec<CspIdpConfig>> {
        self.idp_config_repository.list_idp_configs(filter).await
    }

    /// Lists the active configurations of one account.
    pub async fn list_active_idp_configs_for_account(
        &self,
        csp_account_id: CspAccountId,
    ) -> AppResult<Vec<CspIdpConfig>> {
        self.idp_config_repository
            .list_idp_configs(&CspIdpConfigFilter {
                csp_account_id: Some(csp_account_id),
                is_active: Some(true),
                ..CspIdpConfigFilter::default()
            })
            .await
    }

    /// Applies a partial update. A changed method or key map is validated again, and a
    /// replacement plaintext secret is encrypted.
    pub async fn update_idp_config(
        &self,
        actor: &CallerIdentity,
        idp_config_id: CspIdpConfigId,
        input: UpdateCspIdpConfigInput,
    ) -> AppResult<CspIdpConfig> {
        let current = self.get_idp_config(idp_config_id).await?;
        let account = self.require_account(current.csp_account_id()).await?;

        if input.auth_method.is_some() && input.config.is_none() {
            return Err(AppError::InvalidArgument(
                "changing the auth method requires a replacement config".to_owned(),
            ));
        }

        let updated = CspIdpConfig::new(CspIdpConfigInput {
            id: current.id(),
            name: input
                .name
                .unwrap_or_else(|| current.name().as_str().to_owned()),
            csp_account_id: current.csp_account_id(),
            csp_type: account.csp_type(),
            auth_method: input.auth_method.unwrap_or_else(|| current.auth_method()),
            config: input
                .config
                .unwrap_or_else(|| current.trust().to_entries()),
            description: input
                .description
                .or_else(|| current.description().map(str::to_owned)),
            is_active: current.is_active(),
        })?
        .seal_secret(|plaintext| self.secret_encryptor.encrypt(plaintext))?;

        if updated.name() != current.name()
            && self
                .idp_config_repository
                .idp_config_exists_by_name(updated.name().as_str(), account.id())
                .await?
        {
            return Err(AppError::AlreadyExists(format!(
                "idp config '{}' already exists for account '{}'",
                updated.name(),
                account.id()
            )));
        }

        self.idp_config_repository
            .update_idp_config(updated.clone())
            .await?;

        self.record(
            actor,
            AuditAction::IdpConfigUpdated,
            "csp_idp_config",
            idp_config_id.to_string(),
            format!(
                "updated {} idp config '{}'",
                updated.auth_method(),
                updated.name()
            ),
        )
        .await?;

        Ok(updated)
    }

    /// Activates or deactivates a configuration.
    pub async fn set_idp_config_active(
        &self,
        actor: &CallerIdentity,
        idp_config_id: CspIdpConfigId,
        is_active: bool,
    ) -> AppResult<CspIdpConfig> {
        let config = self
            .get_idp_config(idp_config_id)
            .await?
            .with_active(is_active);

        self.idp_config_repository
            .update_idp_config(config.clone())
            .await?;

        self.record(
            actor,
            AuditAction::IdpConfigUpdated,
            "csp_idp_config",
            idp_config_id.to_string(),
            format!(
                "{} idp config '{}'",
                if is_active { "activated" } else { "deactivated" },
                config.name()
            ),
        )
        .await?;

        Ok(config)
    }

    /// Deletes a configuration. CSP roles referencing it lose the reference.
    pub async fn delete_idp_config(
        &self,
        actor: &CallerIdentity,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<()> {
        self.idp_config_repository
            .delete_idp_config(idp_config_id)
            .await?;

        self.record(
            actor,
            AuditAction::IdpConfigDeleted,
            "csp_idp_config",
            idp_config_id.to_string(),
            format!("deleted idp config '{idp_config_id}'"),
        )
        .await
    }

    /// Returns whether the (name, account) key is taken.
    pub async fn idp_config_exists_by_name(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        self.idp_config_repository
            .idp_config_exists_by_name(name.trim(), csp_account_id)
            .await
    }
}
