use super::*;

impl PostgresTrustStoreRepository {
    pub(super) async fn insert_policy_impl(&self, policy: CspPolicy) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO csp_policies (
                id,
                name,
                csp_account_id,
                policy_type,
                provider_policy_id,
                document,
                description
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(policy.id().as_uuid())
        .bind(policy.name().as_str())
        .bind(policy.csp_account_id().as_uuid())
        .bind(policy.policy_type().as_str())
        .bind(policy.provider_policy_id())
        .bind(Json(policy.document()))
        .bind(policy.description())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(error, || {
                format!(
                    "policy '{}' already exists in csp account '{}'",
                    policy.name(),
                    policy.csp_account_id()
                )
            })
        })?;

        Ok(())
    }

    pub(super) async fn update_policy_impl(&self, policy: CspPolicy) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE csp_policies
            SET name = $2,
                policy_type = $3,
                provider_policy_id = $4,
                document = $5,
                description = $6,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(policy.id().as_uuid())
        .bind(policy.name().as_str())
        .bind(policy.policy_type().as_str())
        .bind(policy.provider_policy_id())
        .bind(Json(policy.document()))
        .bind(policy.description())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            map_unique_violation(error, || {
                format!(
                    "policy '{}' already exists in csp account '{}'",
                    policy.name(),
                    policy.csp_account_id()
                )
            })
        })?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "policy '{}' does not exist",
                policy.id()
            )));
        }

        Ok(())
    }

    pub(super) async fn find_policy_impl(
        &self,
        policy_id: CspPolicyId,
    ) -> AppResult<Option<CspPolicy>> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT id, name, csp_account_id, policy_type, provider_policy_id, document, description
            FROM csp_policies
            WHERE id = $1
            "#,
        )
        .bind(policy_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find policy: {error}")))?;

        row.map(CspPolicy::try_from).transpose()
    }

    pub(super) async fn find_policy_by_provider_id_impl(
        &self,
        csp_account_id: CspAccountId,
        provider_policy_id: &str,
    ) -> AppResult<Option<CspPolicy>> {
        let row = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT id, name, csp_account_id, policy_type, provider_policy_id, document, description
            FROM csp_policies
            WHERE csp_account_id = $1 AND provider_policy_id = $2
            "#,
        )
        .bind(csp_account_id.as_uuid())
        .bind(provider_policy_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to find policy by provider id '{provider_policy_id}': {error}"
            ))
        })?;

        row.map(CspPolicy::try_from).transpose()
    }

    pub(super) async fn policy_exists_by_name_impl(
        &self,
        name: &str,
        csp_account_id: CspAccountId,
    ) -> AppResult<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM csp_policies
                WHERE name = $1 AND csp_account_id = $2
            )
            "#,
        )
        .bind(name.trim())
        .bind(csp_account_id.as_uuid())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to check policy name: {error}")))
    }

    pub(super) async fn list_policies_impl(
        &self,
        filter: &CspPolicyFilter,
    ) -> AppResult<Vec<CspPolicy>> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "SELECT id, name, csp_account_id, policy_type, provider_policy_id, document, description FROM csp_policies WHERE true",
        );

        if let Some(csp_account_id) = filter.csp_account_id {
            builder.push(" AND csp_account_id = ");
            builder.push_bind(csp_account_id.as_uuid());
        }
        if let Some(policy_type) = filter.policy_type {
            builder.push(" AND policy_type = ");
            builder.push_bind(policy_type.as_str());
        }
        push_name_filter(&mut builder, "name", filter.name_contains.as_deref());
        builder.push(" ORDER BY name");

        let rows = builder
            .build_query_as::<PolicyRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list policies: {error}")))?;

        rows.into_iter().map(CspPolicy::try_from).collect()
    }

    pub(super) async fn delete_policy_impl(&self, policy_id: CspPolicyId) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let locked = sqlx::query_scalar::<_, i32>(
            "SELECT 1 FROM csp_policies WHERE id = $1 FOR UPDATE",
        )
        .bind(policy_id.as_uuid())
        .fetch_optional(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to lock policy: {error}")))?;

        if locked.is_none() {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' does not exist"
            )));
        }

        let attachments = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM csp_role_policy_mappings WHERE policy_id = $1",
        )
        .bind(policy_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to count policy attachments: {error}"))
        })?;

        if attachments > 0 {
            return Err(AppError::DependentsExist(format!(
                "policy '{policy_id}' is attached to {attachments} csp roles"
            )));
        }

        sqlx::query("DELETE FROM csp_policies WHERE id = $1")
            .bind(policy_id.as_uuid())
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                map_delete_error(error, "policy", || {
                    format!("policy '{policy_id}' was attached to a csp role while being deleted")
                })
            })?;

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn attach_policy_to_role_impl(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let (role_exists, policy_exists) = sqlx::query_as::<_, (bool, bool)>(
            r#"
            SELECT
                EXISTS (SELECT 1 FROM csp_roles WHERE id = $1),
                EXISTS (SELECT 1 FROM csp_policies WHERE id = $2)
            "#,
        )
        .bind(csp_role_id.as_uuid())
        .bind(policy_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to resolve policy attachment: {error}"))
        })?;

        if !role_exists {
            return Err(AppError::NotFound(format!(
                "csp role '{csp_role_id}' does not exist"
            )));
        }
        if !policy_exists {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' does not exist"
            )));
        }

        let rows_affected = sqlx::query(
            r#"
            INSERT INTO csp_role_policy_mappings (csp_role_id, policy_id)
            VALUES ($1, $2)
            ON CONFLICT (csp_role_id, policy_id) DO NOTHING
            "#,
        )
        .bind(csp_role_id.as_uuid())
        .bind(policy_id.as_uuid())
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to attach policy: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::AlreadyExists(format!(
                "policy '{policy_id}' is already attached to csp role '{csp_role_id}'"
            )));
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        Ok(())
    }

    pub(super) async fn detach_policy_from_role_impl(
        &self,
        csp_role_id: CspRoleId,
        policy_id: CspPolicyId,
    ) -> AppResult<()> {
        let rows_affected = sqlx::query(
            r#"
            DELETE FROM csp_role_policy_mappings
            WHERE csp_role_id = $1 AND policy_id = $2
            "#,
        )
        .bind(csp_role_id.as_uuid())
        .bind(policy_id.as_uuid())
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to detach policy: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(AppError::NotFound(format!(
                "policy '{policy_id}' is not attached to csp role '{csp_role_id}'"
            )));
        }

        Ok(())
    }

    pub(super) async fn list_policies_for_role_impl(
        &self,
        csp_role_id: CspRoleId,
    ) -> AppResult<Vec<CspPolicy>> {
        let rows = sqlx::query_as::<_, PolicyRow>(
            r#"
            SELECT
                policies.id,
                policies.name,
                policies.csp_account_id,
                policies.policy_type,
                policies.provider_policy_id,
                policies.document,
                policies.description
            FROM csp_role_policy_mappings AS attachments
            INNER JOIN csp_policies AS policies
                ON policies.id = attachments.policy_id
            WHERE attachments.csp_role_id = $1
            ORDER BY policies.name
            "#,
        )
        .bind(csp_role_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list policies for csp role '{csp_role_id}': {error}"
            ))
        })?;

        rows.into_iter().map(CspPolicy::try_from).collect()
    }

    pub(super) async fn list_role_ids_for_policy_impl(
        &self,
        policy_id: CspPolicyId,
    ) -> AppResult<Vec<CspRoleId>> {
        let role_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT csp_role_id
            FROM csp_role_policy_mappings
            WHERE policy_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(policy_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to list csp roles for policy '{policy_id}': {error}"
            ))
        })?;

        Ok(role_ids.into_iter().map(CspRoleId::from_uuid).collect())
    }
}
