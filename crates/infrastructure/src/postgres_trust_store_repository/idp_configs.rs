use super::*;

const IDP_CONFIG_SELECT: &str = r#"
    SELECT
        configs.id,
        configs.name,
        configs.csp_account_id,
        accounts.csp_type,
        configs.auth_method,
        configs.config,
        configs.description,
        configs.is_active
    FROM csp_idp_configs AS configs
    INNER JOIN csp_accounts AS accounts
        ON accounts.id = configs.csp_account_id
"#;

impl PostgresTrustStoreRepository {
    pub(super) async fn insert_idp_config_impl(&self, config: CspIdpConfig) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO csp_idp_configs (
                id,
                name,
                csp_account_id,
                auth_method,
                config,
                description,
                is_active
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(config.id().as_uuid())
        .bind(config.name().as_str())
        .bind(config.csp_account_id().as_uuid())
        .bind(config.auth_method().as_str())
        .bind(Json(config.trust().to_entries()))
        .bind(config.description())
        .bind(config.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(error, || {
                format!(
                    "idp config '{}' already exists in csp account '{}'",
                    config.name(),
                    config.csp_account_id()
                )
            })
        })?;

        Ok(())
    }

    pub(super) async fn update_idp_config_impl(&self, config: CspIdpConfig) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE csp_idp_configs
            SET name = $2,
                auth_method = $3,
                config = $4,
                description = $5,
                is_active = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(config.id().as_uuid())
        .bind(config.name().as_str())
        .bind(config.auth_method().as_str())
        .bind(Json(config.trust().to_entries()))
        .bind(config.description())
        .bind(config.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(error, || {
                format!(
                    "idp config '{}' already exists in csp account '{}'",
                    config.name(),
                    config.csp_account_id()
                )
            })
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "idp config '{}' does not exist",
                config.id()
            )));
        }

        Ok(())
    }

    pub(super) async fn find_idp_config_impl(
        &self,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<Option<CspIdpConfig>> {
        let query = format!("{IDP_CONFIG_SELECT} WHERE configs.id = $1");
        let row = sqlx::query_as::<_, IdpConfigRow>(query.as_str())
            .bind(idp_config_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find idp config: {error}")))?;

        row.map(CspIdpConfig::try_from).transpose()
    }

    pub(super) async fn idp_config_exists_by_name_impl(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM csp_idp_configs
                WHERE name = $1 AND csp_account_id = $2
            )
            "#,
        )
        .bind(name.trim())
        .bind(csp_account_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to check idp config name: {error}"))
        })
    }

    pub(super) async fn list_idp_configs_impl(
        &self,
        filter: &CspIdpConfigFilter,
    ) -> AppResult<Vec<CspIdpConfig>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(IDP_CONFIG_SELECT);
        builder.push(" WHERE true");

        if let Some(csp_account_id) = filter.csp_account_id {
            builder.push(" AND configs.csp_account_id = ");
            builder.push_bind(csp_account_id.as_uuid());
        }
        if let Some(auth_method) = filter.auth_method {
            builder.push(" AND configs.auth_method = ");
            builder.push_bind(auth_method.as_str());
        }
        if let Some(is_active) = filter.is_active {
            builder.push(" AND configs.is_active = ");
            builder.push_bind(is_active);
        }
        push_name_filter(&mut builder, "configs.name", filter.name_contains.as_deref());
        builder.push(" ORDER BY configs.created_at, configs.name");

        let rows = builder
            .build_query_as::<IdpConfigRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list idp configs: {error}")))?;

        rows.into_iter().map(CspIdpConfig::try_from).collect()
    }

    pub(super) async fn delete_idp_config_impl(
        &self,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query("DELETE FROM csp_idp_configs WHERE id = $1")
            .bind(idp_config_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete idp config: {error}")))?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "idp config '{idp_config_id}' does not exist"
            )));
        }

        Ok(())
    }
}
