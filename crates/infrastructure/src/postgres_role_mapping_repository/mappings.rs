use super::*;

impl PostgresRoleMappingRepository {
    pub(super) async fn upsert_mapping_impl(
        &self,
        input: UpsertRoleMappingInput,
    ) -> AppResult<RoleCspRoleMapping> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let (role_exists, has_csp_scope, csp_role_exists) =
            sqlx::query_as::<_, (bool, bool, bool)>(
                r#"
                SELECT
                    EXISTS (SELECT 1 FROM role_masters WHERE id = $1),
                    EXISTS (SELECT 1 FROM role_subs WHERE role_id = $1 AND scope = $2),
                    EXISTS (SELECT 1 FROM csp_roles WHERE id = $3)
                "#,
            )
            .bind(input.role_id.as_uuid())
            .bind(RoleScope::Csp.as_str())
            .bind(input.csp_role_id.as_uuid())
            .fetch_one(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to resolve role mapping endpoints: {error}"))
            })?;

        if !role_exists {
            return Err(AppError::NotFound(format!(
                "role '{}' does not exist",
                input.role_id
            )));
        }
        if !has_csp_scope {
            return Err(AppError::InvalidState(format!(
                "role '{}' has no csp scope and cannot be mapped to csp roles",
                input.role_id
            )));
        }
        if !csp_role_exists {
            return Err(AppError::NotFound(format!(
                "csp role '{}' does not exist",
                input.csp_role_id
            )));
        }

        let row = sqlx::query_as::<_, MappingRow>(
            r#"
            INSERT INTO role_csp_role_mappings (role_id, auth_method, csp_role_id, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (role_id, auth_method, csp_role_id)
            DO UPDATE SET description = EXCLUDED.description
            RETURNING role_id, auth_method, csp_role_id, description, created_at
            "#,
        )
        .bind(input.role_id.as_uuid())
        .bind(input.auth_method.as_str())
        .bind(input.csp_role_id.as_uuid())
        .bind(input.description.as_deref())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to upsert role mapping: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        RoleCspRoleMapping::try_from(row)
    }

    pub(super) async fn remove_mapping_impl(
        &self,
        role_id: RoleId,
        csp_role_id: CspRoleId,
        auth_method: AuthMethod,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM role_csp_role_mappings
            WHERE role_id = $1 AND auth_method = $2 AND csp_role_id = $3
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(auth_method.as_str())
        .bind(csp_role_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to remove role mapping: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "role mapping '{role_id}:{auth_method}:{csp_role_id}' does not exist"
            )));
        }

        Ok(())
    }

    pub(super) async fn remove_all_mappings_for_role_impl(&self, role_id: RoleId) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM role_csp_role_mappings WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to remove role mappings: {error}"))
            })?;

        Ok(result.rows_affected())
    }

    pub(super) async fn list_csp_roles_for_role_impl(
        &self,
        role_id: RoleId,
        auth_method: AuthMethod,
    ) -> AppResult<Vec<CspRole>> {
        let query = format!(
            r#"
            SELECT {CSP_ROLE_COLUMNS}
            FROM role_csp_role_mappings AS mappings
            INNER JOIN csp_roles
                ON csp_roles.id = mappings.csp_role_id
            WHERE mappings.role_id = $1 AND mappings.auth_method = $2
            ORDER BY csp_roles.name
            "#
        );
        let rows = sqlx::query_as::<_, CspRoleRow>(query.as_str())
            .bind(role_id.as_uuid())
            .bind(auth_method.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to resolve csp roles for role '{role_id}': {error}"
                ))
            })?;

        rows.into_iter().map(CspRole::try_from).collect()
    }

    pub(super) async fn list_mappings_for_csp_role_impl(
        &self,
        csp_role_id: CspRoleId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        let query = format!(
            r#"
            SELECT {MAPPING_COLUMNS}
            FROM role_csp_role_mappings AS mappings
            WHERE mappings.csp_role_id = $1
            ORDER BY mappings.created_at
            "#
        );
        let rows = sqlx::query_as::<_, MappingRow>(query.as_str())
            .bind(csp_role_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list mappings for csp role '{csp_role_id}': {error}"
                ))
            })?;

        rows.into_iter().map(RoleCspRoleMapping::try_from).collect()
    }

    pub(super) async fn list_mappings_for_csp_role_and_account_impl(
        &self,
        csp_role_id: CspRoleId,
        csp_account_id: CspAccountId,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        let query = format!(
            r#"
            SELECT {MAPPING_COLUMNS}
            FROM role_csp_role_mappings AS mappings
            INNER JOIN csp_roles
                ON csp_roles.id = mappings.csp_role_id
            WHERE mappings.csp_role_id = $1 AND csp_roles.csp_account_id = $2
            ORDER BY mappings.created_at
            "#
        );
        let rows = sqlx::query_as::<_, MappingRow>(query.as_str())
            .bind(csp_role_id.as_uuid())
            .bind(csp_account_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list mappings for csp role '{csp_role_id}' in account '{csp_account_id}': {error}"
                ))
            })?;

        rows.into_iter().map(RoleCspRoleMapping::try_from).collect()
    }

    pub(super) async fn list_mappings_for_role_and_csp_type_impl(
        &self,
        role_id: RoleId,
        csp_type: CspType,
    ) -> AppResult<Vec<RoleCspRoleMapping>> {
        let query = format!(
            r#"
            SELECT {MAPPING_COLUMNS}
            FROM role_csp_role_mappings AS mappings
            INNER JOIN csp_roles
                ON csp_roles.id = mappings.csp_role_id
            WHERE mappings.role_id = $1 AND csp_roles.csp_type = $2
            ORDER BY mappings.created_at
            "#
        );
        let rows = sqlx::query_as::<_, MappingRow>(query.as_str())
            .bind(role_id.as_uuid())
            .bind(csp_type.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to list {csp_type} mappings for role '{role_id}': {error}"
                ))
            })?;

        rows.into_iter().map(RoleCspRoleMapping::try_from).collect()
    }
}
