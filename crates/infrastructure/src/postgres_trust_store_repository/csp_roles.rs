use super::*;

impl PostgresTrustStoreRepository {
    pub(super) async fn insert_csp_role_impl(&self, role: CspRole) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO csp_roles (
                id,
                name,
                description,
                csp_type,
                idp_identifier,
                provider_role_id,
                status,
                max_session_duration,
                path,
                csp_account_id,
                csp_idp_config_id,
                extended_config
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.csp_type().as_str())
        .bind(role.idp_identifier())
        .bind(role.provider_role_id())
        .bind(role.status())
        .bind(role.max_session_duration())
        .bind(role.path())
        .bind(role.csp_account_id().map(|id| id.as_uuid()))
        .bind(role.csp_idp_config_id().map(|id| id.as_uuid()))
        .bind(Json(role.extended_config()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(error, || {
                format!(
                    "csp role '{}' already exists for {}",
                    role.name(),
                    role.csp_type()
                )
            })
        })?;

        Ok(())
    }

    pub(super) async fn find_csp_role_impl(
        &self,
        csp_role_id: CspRoleId,
    ) -> AppResult<Option<CspRole>> {
        let query = format!("SELECT {CSP_ROLE_COLUMNS} FROM csp_roles WHERE csp_roles.id = $1");
        let row = sqlx::query_as::<_, CspRoleRow>(query.as_str())
            .bind(csp_role_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find csp role: {error}")))?;

        row.map(CspRole::try_from).transpose()
    }

    pub(super) async fn find_csp_role_by_name_impl(
        &self,
        name: &str,
        csp_type: CspType,
    ) -> AppResult<Option<CspRole>> {
        let query = format!(
            "SELECT {CSP_ROLE_COLUMNS} FROM csp_roles WHERE csp_roles.name = $1 AND csp_roles.csp_type = $2"
        );
        let row = sqlx::query_as::<_, CspRoleRow>(query.as_str())
            .bind(name.trim())
            .bind(csp_type.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to find csp role by name: {error}"))
            })?;

        row.map(CspRole::try_from).transpose()
    }

    pub(super) async fn list_csp_roles_impl(
        &self,
        filter: &CspRoleFilter,
    ) -> AppResult<Vec<CspRole>> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {CSP_ROLE_COLUMNS} FROM csp_roles WHERE true"));

        if let Some(csp_type) = filter.csp_type {
            builder.push(" AND csp_roles.csp_type = ");
            builder.push_bind(csp_type.as_str());
        }
        if let Some(csp_account_id) = filter.csp_account_id {
            builder.push(" AND csp_roles.csp_account_id = ");
            builder.push_bind(csp_account_id.as_uuid());
        }
        push_name_filter(&mut builder, "csp_roles.name", filter.name_contains.as_deref());
        builder.push(" ORDER BY csp_roles.csp_type, csp_roles.name");

        let rows = builder
            .build_query_as::<CspRoleRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list csp roles: {error}")))?;

        rows.into_iter().map(CspRole::try_from).collect()
    }

    pub(super) async fn delete_csp_role_impl(&self, csp_role_id: CspRoleId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let locked = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM csp_roles WHERE id = $1 FOR UPDATE",
        )
        .bind(csp_role_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock csp role: {error}")))?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "csp role '{csp_role_id}' does not exist"
            )));
        }

        let (mapping_count, attachment_count) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM role_csp_role_mappings WHERE csp_role_id = $1),
                (SELECT COUNT(*) FROM csp_role_policy_mappings WHERE csp_role_id = $1)
            "#,
        )
        .bind(csp_role_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count csp role dependents: {error}"))
        })?;

        if mapping_count > 0 || attachment_count > 0 {
            return Err(AppError::DependentsExist(format!(
                "csp role '{csp_role_id}' has {mapping_count} role mappings and {attachment_count} attached policies"
            )));
        }

        sqlx::query("DELETE FROM csp_roles WHERE id = $1")
            .bind(csp_role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_delete_error(error, "csp role", || {
                    format!("csp role '{csp_role_id}' gained dependents while being deleted")
                })
            })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
