use super::*;

impl PostgresRoleMappingRepository {
    pub(super) async fn insert_role_impl(&self, role: RoleMaster) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query(
            r#"
            INSERT INTO role_masters (id, parent_id, name, description, predefined)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(role.id().as_uuid())
        .bind(role.parent_id().map(|id| id.as_uuid()))
        .bind(role.name().as_str())
        .bind(role.description())
        .bind(role.predefined())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(database_error) = &error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::AlreadyExists(format!("role '{}' already exists", role.name()));
            }

            AppError::Internal(format!("failed to create role: {error}"))
        })?;

        for scope in role.scopes() {
            sqlx::query(
                r#"
                INSERT INTO role_subs (role_id, scope)
                VALUES ($1, $2)
                ON CONFLICT (role_id, scope) DO NOTHING
                "#,
            )
            .bind(role.id().as_uuid())
            .bind(scope.as_str())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to persist role scope: {error}")))?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn find_role_impl(&self, role_id: RoleId) -> AppResult<Option<RoleMaster>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id,
                roles.parent_id,
                roles.name,
                roles.description,
                roles.predefined,
                subs.scope
            FROM role_masters AS roles
            LEFT JOIN role_subs AS subs
                ON subs.role_id = roles.id
            WHERE roles.id = $1
            ORDER BY subs.scope
            "#,
        )
        .bind(role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        Ok(aggregate_roles(rows)?.into_iter().next())
    }

    pub(super) async fn find_role_by_name_impl(&self, name: &str) -> AppResult<Option<RoleMaster>> {
        let rows = sqlx::query_as::<_, RoleRow>(
            r#"
            SELECT
                roles.id,
                roles.parent_id,
                roles.name,
                roles.description,
                roles.predefined,
                subs.scope
            FROM role_masters AS roles
            LEFT JOIN role_subs AS subs
                ON subs.role_id = roles.id
            WHERE roles.name = $1
            ORDER BY subs.scope
            "#,
        )
        .bind(name.trim())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find role by name: {error}")))?;

        Ok(aggregate_roles(rows)?.into_iter().next())
    }

    pub(super) async fn add_role_scope_impl(
        &self,
        role_id: RoleId,
        scope: RoleScope,
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let role_exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM role_masters WHERE id = $1)")
                .bind(role_id.as_uuid())
                .fetch_one(&mut *transaction)
                .await
                .map_err(|error| AppError::Internal(format!("failed to resolve role: {error}")))?;

        if !role_exists {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        sqlx::query(
            r#"
            INSERT INTO role_subs (role_id, scope)
            VALUES ($1, $2)
            ON CONFLICT (role_id, scope) DO NOTHING
            "#,
        )
        .bind(role_id.as_uuid())
        .bind(scope.as_str())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to add role scope: {error}")))?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn delete_role_cascade_impl(&self, role_id: RoleId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        sqlx::query("DELETE FROM role_csp_role_mappings WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to delete role mappings: {error}"))
            })?;

        sqlx::query("DELETE FROM role_subs WHERE role_id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete role scopes: {error}")))?;

        let rows_affected = sqlx::query("DELETE FROM role_masters WHERE id = $1")
            .bind(role_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                if let sqlx::Error::Database(database_error) = &error
                    && database_error.code().as_deref() == Some("23503")
                {
                    return AppError::DependentsExist(format!(
                        "role '{role_id}' is the parent of other roles"
                    ));
                }

                AppError::Internal(format!("failed to delete role: {error}"))
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!("role '{role_id}' does not exist")));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }
}
