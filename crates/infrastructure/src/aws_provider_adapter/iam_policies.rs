use aws_sdk_iam::types::{Policy, PolicyScopeType};
use cloudtrust_application::provider_ports::PolicyListScope;
use tracing::{debug, info};

use super::*;

fn provider_policy(policy: &Policy) -> AppResult<ProviderPolicy> {
    let provider_policy_id = policy
        .arn()
        .ok_or_else(|| AppError::Provider("provider returned a policy without an arn".to_owned()))?;

    Ok(ProviderPolicy {
        name: policy.policy_name().unwrap_or_default().to_owned(),
        provider_policy_id: provider_policy_id.to_owned(),
        path: policy.path().map(str::to_owned),
        description: policy.description().map(str::to_owned),
        default_version_id: policy.default_version_id().map(str::to_owned),
        attachment_count: policy.attachment_count(),
        created_at: policy.create_date().and_then(to_utc),
        updated_at: policy.update_date().and_then(to_utc),
    })
}

fn scope_type(scope: PolicyListScope) -> PolicyScopeType {
    match scope {
        PolicyListScope::All => PolicyScopeType::All,
        PolicyListScope::Provider => PolicyScopeType::Aws,
        PolicyListScope::Local => PolicyScopeType::Local,
    }
}

impl AwsProviderAdapter {
    pub(super) async fn create_policy_impl(
        &self,
        session: &ProviderSession,
        input: CreateProviderPolicyInput,
    ) -> AppResult<ProviderPolicy> {
        let client = self.iam_client(session).await;
        let response = client
            .create_policy()
            .policy_name(input.name.as_str())
            .set_path(input.path)
            .set_description(input.description)
            .policy_document(encode_policy_document(&input.document)?)
            .send()
            .await
            .map_err(|error| map_sdk_error("create_policy", error))?;

        let policy = response
            .policy()
            .ok_or_else(|| AppError::Provider("create_policy returned no policy".to_owned()))?;
        let policy = provider_policy(policy)?;
        info!(
            policy_name = %input.name,
            policy_arn = %policy.provider_policy_id,
            "created aws policy"
        );

        Ok(policy)
    }

    pub(super) async fn get_policy_impl(
        &self,
        session: &ProviderSession,
        provider_policy_id: &str,
    ) -> AppResult<ProviderPolicy> {
        let client = self.iam_client(session).await;
        fetch_policy(&client, provider_policy_id).await
    }

    pub(super) async fn get_policy_document_impl(
        &self,
        session: &ProviderSession,
        provider_policy_id: &str,
        version_id: Option<&str>,
    ) -> AppResult<PolicyDocument> {
        let client = self.iam_client(session).await;
        let version_id = match version_id {
            Some(version_id) => version_id.to_owned(),
            None => fetch_policy(&client, provider_policy_id)
                .await?
                .default_version_id
                .ok_or_else(|| {
                    AppError::Provider(format!(
                        "policy '{provider_policy_id}' has no default version"
                    ))
                })?,
        };

        let response = client
            .get_policy_version()
            .policy_arn(provider_policy_id)
            .version_id(version_id.as_str())
            .send()
            .await
            .map_err(|error| map_sdk_error("get_policy_version", error))?;

        let document = response
            .policy_version()
            .and_then(|version| version.document())
            .ok_or_else(|| {
                AppError::Provider(format!(
                    "policy '{provider_policy_id}' version '{version_id}' has no document"
                ))
            })?;

        decode_policy_document(document)
    }

    pub(super) async fn update_policy_impl(
        &self,
        session: &ProviderSession,
        provider_policy_id: &str,
        document: &PolicyDocument,
    ) -> AppResult<ProviderPolicy> {
        let client = self.iam_client(session).await;

        let mut versions = list_non_default_versions(&client, provider_policy_id).await?;
        if versions.len() + 1 >= MAX_POLICY_VERSIONS {
            versions.sort_by(|left, right| left.1.cmp(&right.1));
            if let Some((oldest, _)) = versions.first() {
                delete_policy_version(&client, provider_policy_id, oldest).await?;
            }
        }

        let response = client
            .create_policy_version()
            .policy_arn(provider_policy_id)
            .policy_document(encode_policy_document(document)?)
            .set_as_default(true)
            .send()
            .await
            .map_err(|error| map_sdk_error("create_policy_version", error))?;

        info!(
            policy_arn = provider_policy_id,
            version_id = response
                .policy_version()
                .and_then(|version| version.version_id())
                .unwrap_or_default(),
            "published aws policy version"
        );

        fetch_policy(&client, provider_policy_id).await
    }

    pub(super) async fn delete_policy_impl(
        &self,
        session: &ProviderSession,
        provider_policy_id: &str,
    ) -> AppResult<()> {
        let client = self.iam_client(session).await;

        for (version_id, _) in list_non_default_versions(&client, provider_policy_id).await? {
            delete_policy_version(&client, provider_policy_id, version_id.as_str()).await?;
        }

        client
            .delete_policy()
            .policy_arn(provider_policy_id)
            .send()
            .await
            .map_err(|error| map_sdk_error("delete_policy", error))?;

        info!(policy_arn = provider_policy_id, "deleted aws policy");
        Ok(())
    }

    pub(super) async fn list_policies_impl(
        &self,
        session: &ProviderSession,
        filter: &PolicyListFilter,
    ) -> AppResult<PolicyPage> {
        let client = self.iam_client(session).await;
        let response = client
            .list_policies()
            .scope(scope_type(filter.scope))
            .set_path_prefix(filter.path_prefix.clone())
            .set_marker(filter.marker.clone())
            .set_max_items(filter.max_items)
            .send()
            .await
            .map_err(|error| map_sdk_error("list_policies", error))?;

        let policies = response
            .policies()
            .iter()
            .map(provider_policy)
            .collect::<AppResult<Vec<_>>>()?;
        let next_marker = response
            .marker()
            .filter(|_| response.is_truncated())
            .map(str::to_owned);

        debug!(
            scope = filter.scope.as_str(),
            count = policies.len(),
            has_more = next_marker.is_some(),
            "listed aws policies"
        );

        Ok(PolicyPage {
            policies,
            next_marker,
        })
    }
}

async fn fetch_policy(
    client: &aws_sdk_iam::Client,
    provider_policy_id: &str,
) -> AppResult<ProviderPolicy> {
    let response = client
        .get_policy()
        .policy_arn(provider_policy_id)
        .send()
        .await
        .map_err(|error| map_sdk_error("get_policy", error))?;

    let policy = response.policy().ok_or_else(|| {
        AppError::NotFound(format!("aws policy '{provider_policy_id}' does not exist"))
    })?;

    provider_policy(policy)
}

/// Returns `(version_id, created_at)` for every non-default version of a policy.
async fn list_non_default_versions(
    client: &aws_sdk_iam::Client,
    provider_policy_id: &str,
) -> AppResult<Vec<(String, Option<DateTime<Utc>>)>> {
    let response = client
        .list_policy_versions()
        .policy_arn(provider_policy_id)
        .send()
        .await
        .map_err(|error| map_sdk_error("list_policy_versions", error))?;

    Ok(response
        .versions()
        .iter()
        .filter(|version| !version.is_default_version())
        .filter_map(|version| {
            Some((
                version.version_id()?.to_owned(),
                version.create_date().and_then(to_utc),
            ))
        })
        .collect())
}

async fn delete_policy_version(
    client: &aws_sdk_iam::Client,
    provider_policy_id: &str,
    version_id: &str,
) -> AppResult<()> {
    client
        .delete_policy_version()
        .policy_arn(provider_policy_id)
        .version_id(version_id)
        .send()
        .await
        .map_err(|error| map_sdk_error("delete_policy_version", error))?;

    debug!(policy_arn = provider_policy_id, version_id, "deleted aws policy version");
    Ok(())
}
