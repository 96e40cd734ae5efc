use super::*;

impl PolicySyncService {
    /// Returns a policy's document, fetching the provider's default version
    /// for managed policies that have no local copy.
    pub async fn policy_document(
        &self,
        context: &CallContext,
        actor: &CallerIdentity,
        policy_id: CspPolicyId,
    ) -> AppResult<PolicyDocument> {
        let policy = self
            .policy_repository
            .find_policy(policy_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("policy '{policy_id}' does not exist")))?;

        if policy.has_local_document() {
            return Ok(policy.document().clone());
        }

        let provider_policy_id = match (policy.policy_type(), policy.provider_policy_id()) {
            (PolicyType::Managed, Some(provider_policy_id)) => provider_policy_id,
            _ => {
                return Err(AppError::NotFound(format!(
                    "policy '{policy_id}' has no document"
                )));
            }
        };

        let account = self.require_account(policy.csp_account_id()).await?;
        let adapter = self.adapters.adapter(account.csp_type())?;
        let credential = self
            .account_credential(
                context,
                actor,
                &account,
                POLICY_GET_SESSION_NAME,
                POLICY_GET_DURATION_SECONDS,
            )
            .await?;

        adapter
            .get_policy_document(
                context,
                &ProviderSession::from_temp_credential(&credential),
                provider_policy_id,
                None,
            )
            .await
    }
}
