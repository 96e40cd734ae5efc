use super::*;

impl PostgresTrustStoreRepository {
    pub(super) async fn insert_account_impl(&self, account: CspAccount) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO csp_accounts (id, name, csp_type, descriptors, description, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.name().as_str())
        .bind(account.csp_type().as_str())
        .bind(Json(account.descriptors()))
        .bind(account.description())
        .bind(account.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(error, || {
                format!(
                    "csp account '{}' already exists for {}",
                    account.name(),
                    account.csp_type()
                )
            })
        })?;

        Ok(())
    }

    pub(super) async fn update_account_impl(&self, account: CspAccount) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE csp_accounts
            SET name = $2,
                descriptors = $3,
                description = $4,
                is_active = $5,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(account.id().as_uuid())
        .bind(account.name().as_str())
        .bind(Json(account.descriptors()))
        .bind(account.description())
        .bind(account.is_active())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(error, || {
                format!(
                    "csp account '{}' already exists for {}",
                    account.name(),
                    account.csp_type()
                )
            })
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "csp account '{}' does not exist",
                account.id()
            )));
        }

        Ok(())
    }

    pub(super) async fn find_account_impl(
        &self,
        account_id: CspAccountId,
    ) -> AppResult<Option<CspAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, csp_type, descriptors, description, is_active
            FROM csp_accounts
            WHERE id = $1
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find csp account: {error}")))?;

        row.map(CspAccount::try_from).transpose()
    }

    pub(super) async fn find_account_by_name_impl(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspAccount>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, name, csp_type, descriptors, description, is_active
            FROM csp_accounts
            WHERE name = $1 AND csp_type = $2
            "#,
        )
        .bind(name.trim())
        .bind(csp_type.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find csp account by name: {error}"))
        })?;

        row.map(CspAccount::try_from).transpose()
    }

    pub(super) async fn account_exists_impl(&self, account_id: CspAccountId) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM csp_accounts WHERE id = $1)")
            .bind(account_id.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to check csp account existence: {error}"))
            })
    }

    pub(super) async fn list_accounts_impl(
        &self,
        filter: &CspAccountFilter,
    ) -> AppResult<Vec<CspAccount>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, name, csp_type, descriptors, description, is_active FROM csp_accounts WHERE true",
        );

        if let Some(csp_type) = filter.csp_type {
            builder.push(" AND csp_type = ");
            builder.push_bind(csp_type.as_str());
        }
        if let Some(is_active) = filter.is_active {
            builder.push(" AND is_active = ");
            builder.push_bind(is_active);
        }
        push_name_filter(&mut builder, "name", filter.name_contains.as_deref());
        builder.push(" ORDER BY csp_type, name");

        let rows = builder
            .build_query_as::<AccountRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list csp accounts: {error}")))?;

        rows.into_iter().map(CspAccount::try_from).collect()
    }

    pub(super) async fn delete_account_impl(&self, account_id: CspAccountId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let locked = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM csp_accounts WHERE id = $1 FOR UPDATE",
        )
        .bind(account_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock csp account: {error}")))?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "csp account '{account_id}' does not exist"
            )));
        }

        let (config_count, policy_count) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM csp_idp_configs WHERE csp_account_id = $1),
                (SELECT COUNT(*) FROM csp_policies WHERE csp_account_id = $1)
            "#,
        )
        .bind(account_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count csp account dependents: {error}"))
        })?;

        if config_count > 0 || policy_count > 0 {
            return Err(AppError::DependentsExist(format!(
                "csp account '{account_id}' has {config_count} idp configs and {policy_count} policies"
            )));
        }

        sqlx::query("DELETE FROM csp_accounts WHERE id = $1")
            .bind(account_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_delete_error(error, "csp account", || {
                    format!("csp account '{account_id}' gained dependents while being deleted")
                })
            })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
