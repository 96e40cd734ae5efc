use super::*;

impl PolicySyncService {
    /// Pulls the provider's policies into the local store for one account.
    ///
    /// Policies are matched by provider identifier: known ones get their name
    /// and description refreshed, unknown ones are inserted as managed
    /// policies. Local policies missing at the provider are kept. A record
    /// that fails to reconcile is logged and reported as skipped.
    pub async fn sync_from_cloud(
        &self,
        context: &CallContext,
        actor: &CallerIdentity,
        account_id: CspAccountId,
        scope: PolicyListScope,
    ) -> AppResult<PolicySyncReport> {
        let account = self.require_account(account_id).await?;
        let adapter = self.adapters.adapter(account.csp_type())?;
        let credential = self
            .account_credential(
                context,
                actor,
                &account,
                POLICY_SYNC_SESSION_NAME,
                POLICY_SYNC_DURATION_SECONDS,
            )
            .await?;
        let session = ProviderSession::from_temp_credential(&credential);

        let mut report = PolicySyncReport::default();
        let mut filter = PolicyListFilter::first_page(scope);
        loop {
            let page = adapter.list_policies(context, &session, &filter).await?;

            for provider_policy in page.policies {
                let name = provider_policy.name.clone();
                match self.reconcile_policy(&account, provider_policy).await {
                    Ok(policy) => report.reconciled.push(policy),
                    Err(error) => {
                        warn!(
                            account_id = %account_id,
                            policy = %name,
                            error = %error,
                            "skipping provider policy during sync"
                        );
                        report.skipped.push(name);
                    }
                }
            }

            match page.next_marker {
                Some(marker) => filter = filter.next_page(marker),
                None => break,
            }
        }

        let detail = serde_json::json!({
            "scope": scope.as_str(),
            "reconciled": report.reconciled.len(),
            "skipped": report.skipped,
        })
        .to_string();

        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                AuditAction::PolicySyncCompleted,
                "csp_account",
                account_id.to_string(),
                Some(detail),
            ))
            .await?;

        info!(
            account_id = %account_id,
            scope = scope.as_str(),
            reconciled = report.reconciled.len(),
            skipped = report.skipped.len(),
            "policy sync completed"
        );

        Ok(report)
    }

    async fn reconcile_policy(
        &self,
        account: &CspAccount,
        provider_policy: ProviderPolicy,
    ) -> AppResult<CspPolicy> {
        let existing = self
            .policy_repository
            .find_policy_by_provider_id(account.id(), &provider_policy.provider_policy_id)
            .await?;

        match existing {
            Some(current) => {
                let refreshed = CspPolicy::new(CspPolicyInput {
                    id: current.id(),
                    name: provider_policy.name,
                    csp_account_id: account.id(),
                    policy_type: current.policy_type(),
                    provider_policy_id: Some(provider_policy.provider_policy_id),
                    document: current.document().clone(),
                    description: provider_policy
                        .description
                        .or_else(|| current.description().map(str::to_owned)),
                })?;

                if refreshed.name() != current.name()
                    && self
                        .policy_repository
                        .policy_exists_by_name(refreshed.name().as_str(), account.id())
                        .await?
                {
                    return Err(AppError::AlreadyExists(format!(
                        "policy '{}' already exists for account '{}'",
                        refreshed.name(),
                        account.id()
                    )));
                }

                if refreshed != current {
                    self.policy_repository
                        .update_policy(refreshed.clone())
                        .await?;
                }
                Ok(refreshed)
            }
            None => {
                let created = CspPolicy::new(CspPolicyInput {
                    id: CspPolicyId::new(),
                    name: provider_policy.name,
                    csp_account_id: account.id(),
                    policy_type: PolicyType::Managed,
                    provider_policy_id: Some(provider_policy.provider_policy_id),
                    document: PolicyDocument::new(),
                    description: provider_policy.description,
                })?;

                if self
                    .policy_repository
                    .policy_exists_by_name(created.name().as_str(), account.id())
                    .await?
                {
                    return Err(AppError::AlreadyExists(format!(
                        "policy '{}' already exists for account '{}'",
                        created.name(),
                        account.id()
                    )));
                }

                self.policy_repository.insert_policy(created.clone()).await?;
                Ok(created)
            }
        }
    }
}
