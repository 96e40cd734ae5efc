use aws_sdk_iam::types::{Role, Tag};
use tracing::info;

use super::*;

fn provider_role(role: &Role) -> AppResult<ProviderRole> {
    let assume_role_policy_document = role
        .assume_role_policy_document()
        .map(decode_policy_document)
        .transpose()?;

    Ok(ProviderRole {
        name: role.role_name().to_owned(),
        provider_role_id: role.arn().to_owned(),
        role_id: Some(role.role_id().to_owned()),
        path: Some(role.path().to_owned()),
        description: role.description().map(str::to_owned),
        max_session_duration: role.max_session_duration(),
        assume_role_policy_document,
        permissions_boundary: role
            .permissions_boundary()
            .and_then(|boundary| boundary.permissions_boundary_arn())
            .map(str::to_owned),
        created_at: to_utc(role.create_date()),
        last_used_at: role
            .role_last_used()
            .and_then(|last_used| last_used.last_used_date())
            .and_then(to_utc),
        tags: role
            .tags()
            .iter()
            .map(|tag| (tag.key().to_owned(), tag.value().to_owned()))
            .collect(),
    })
}

impl AwsProviderAdapter {
    pub(super) async fn create_role_impl(
        &self,
        session: &ProviderSession,
        input: CreateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        let tags = input
            .tags
            .iter()
            .map(|(key, value)| {
                Tag::builder()
                    .key(key)
                    .value(value)
                    .build()
                    .map_err(|error| {
                        AppError::InvalidArgument(format!("invalid role tag: {error}"))
                    })
            })
            .collect::<AppResult<Vec<_>>>()?;

        let client = self.iam_client(session).await;
        let response = client
            .create_role()
            .role_name(input.name.as_str())
            .set_path(input.path)
            .set_description(input.description)
            .assume_role_policy_document(encode_policy_document(
                &input.assume_role_policy_document,
            )?)
            .set_max_session_duration(input.max_session_duration)
            .set_permissions_boundary(input.permissions_boundary)
            .set_tags((!tags.is_empty()).then_some(tags))
            .send()
            .await
            .map_err(|error| map_sdk_error("create_role", error))?;

        let role = response
            .role()
            .ok_or_else(|| AppError::Provider("create_role returned no role".to_owned()))?;
        info!(role_name = %input.name, role_arn = %role.arn(), "created aws role");

        provider_role(role)
    }

    pub(super) async fn get_role_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<ProviderRole> {
        let client = self.iam_client(session).await;
        let response = client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|error| map_sdk_error("get_role", error))?;

        let role = response
            .role()
            .ok_or_else(|| AppError::NotFound(format!("aws role '{role_name}' does not exist")))?;

        provider_role(role)
    }

    pub(super) async fn update_role_impl(
        &self,
        session: &ProviderSession,
        input: UpdateProviderRoleInput,
    ) -> AppResult<ProviderRole> {
        let client = self.iam_client(session).await;

        if input.description.is_some() || input.max_session_duration.is_some() {
            client
                .update_role()
                .role_name(input.name.as_str())
                .set_description(input.description)
                .set_max_session_duration(input.max_session_duration)
                .send()
                .await
                .map_err(|error| map_sdk_error("update_role", error))?;
        }

        if let Some(document) = &input.assume_role_policy_document {
            client
                .update_assume_role_policy()
                .role_name(input.name.as_str())
                .policy_document(encode_policy_document(document)?)
                .send()
                .await
                .map_err(|error| map_sdk_error("update_assume_role_policy", error))?;
        }

        info!(role_name = %input.name, "updated aws role");
        self.get_role_impl(session, input.name.as_str()).await
    }

    pub(super) async fn delete_role_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<()> {
        let client = self.iam_client(session).await;
        client
            .delete_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|error| map_sdk_error("delete_role", error))?;

        info!(role_name, "deleted aws role");
        Ok(())
    }

    pub(super) async fn attach_role_policy_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
        provider_policy_id: &str,
    ) -> AppResult<()> {
        let client = self.iam_client(session).await;
        client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(provider_policy_id)
            .send()
            .await
            .map_err(|error| map_sdk_error("attach_role_policy", error))?;

        info!(role_name, policy_arn = provider_policy_id, "attached aws policy to role");
        Ok(())
    }

    pub(super) async fn detach_role_policy_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
        provider_policy_id: &str,
    ) -> AppResult<()> {
        let client = self.iam_client(session).await;
        client
            .detach_role_policy()
            .role_name(role_name)
            .policy_arn(provider_policy_id)
            .send()
            .await
            .map_err(|error| map_sdk_error("detach_role_policy", error))?;

        info!(role_name, policy_arn = provider_policy_id, "detached aws policy from role");
        Ok(())
    }

    pub(super) async fn list_attached_role_policies_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<Vec<ProviderAttachedPolicy>> {
        let client = self.iam_client(session).await;
        let mut attached = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = client
                .list_attached_role_policies()
                .role_name(role_name)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|error| map_sdk_error("list_attached_role_policies", error))?;

            attached.extend(response.attached_policies().iter().filter_map(|policy| {
                Some(ProviderAttachedPolicy {
                    name: policy.policy_name()?.to_owned(),
                    provider_policy_id: policy.policy_arn()?.to_owned(),
                })
            }));

            match response.marker() {
                Some(next) if response.is_truncated() => marker = Some(next.to_owned()),
                _ => break,
            }
        }

        Ok(attached)
    }

    pub(super) async fn list_role_policies_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
    ) -> AppResult<Vec<String>> {
        let client = self.iam_client(session).await;
        let mut names = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let response = client
                .list_role_policies()
                .role_name(role_name)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|error| map_sdk_error("list_role_policies", error))?;

            names.extend(response.policy_names().iter().cloned());

            match response.marker() {
                Some(next) if response.is_truncated() => marker = Some(next.to_owned()),
                _ => break,
            }
        }

        Ok(names)
    }

    pub(super) async fn get_role_policy_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
    ) -> AppResult<PolicyDocument> {
        let client = self.iam_client(session).await;
        let response = client
            .get_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(|error| map_sdk_error("get_role_policy", error))?;

        decode_policy_document(response.policy_document())
    }

    pub(super) async fn put_role_policy_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
        document: &PolicyDocument,
    ) -> AppResult<()> {
        let client = self.iam_client(session).await;
        client
            .put_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .policy_document(encode_policy_document(document)?)
            .send()
            .await
            .map_err(|error| map_sdk_error("put_role_policy", error))?;

        info!(role_name, policy_name, "put aws inline role policy");
        Ok(())
    }

    pub(super) async fn delete_role_policy_impl(
        &self,
        session: &ProviderSession,
        role_name: &str,
        policy_name: &str,
    ) -> AppResult<()> {
        let client = self.iam_client(session).await;
        client
            .delete_role_policy()
            .role_name(role_name)
            .policy_name(policy_name)
            .send()
            .await
            .map_err(|error| map_sdk_error("delete_role_policy", error))?;

        info!(role_name, policy_name, "deleted aws inline role policy");
        Ok(())
    }
}
