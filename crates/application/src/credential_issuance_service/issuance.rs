use super::*;

impl CredentialIssuanceService {
    /// Issues a temporary credential through one IdP configuration.
    ///
    /// Any failure yields no credential. Provider calls are not retried.
    pub async fn issue_with_idp_config(
        &self,
        context: &CallContext,
        actor: &CallerIdentity,
        input: IssueCredentialInput,
    ) -> AppResult<TempCredential> {
        let (config, account) = self.load_active_trust(input.idp_config_id).await?;

        self.federate(
            context,
            actor,
            &config,
            &account,
            input.role_identifier.as_str(),
            input.session_name.as_str(),
            normalize_duration(input.duration_seconds),
        )
        .await
    }

    /// Resolves a platform role to exactly one CSP role and issues a credential for it.
    pub async fn issue_for_role(
        &self,
        context: &CallContext,
        actor: &CallerIdentity,
        input: IssueRoleCredentialInput,
    ) -> AppResult<TempCredential> {
        let role = self
            .role_mapping_service
            .role_for_selector(&input.role)
            .await?;

        let mut candidates = self
            .role_mapping_service
            .resolve(role.id(), input.auth_method)
            .await?
            .into_iter()
            .filter(|csp_role| {
                input
                    .csp_account_id
                    .is_none_or(|account_id| csp_role.csp_account_id() == Some(account_id))
            })
            .collect::<Vec<_>>();

        if candidates.len() > 1 {
            return Err(AppError::InvalidArgument(format!(
                "role '{}' maps to {} {} csp roles; narrow the request with a csp account",
                role.name(),
                candidates.len(),
                input.auth_method
            )));
        }
        let Some(csp_role) = candidates.pop() else {
            return Err(AppError::NotFound(format!(
                "role '{}' has no {} csp role mapping",
                role.name(),
                input.auth_method
            )));
        };

        let idp_config_id = csp_role.csp_idp_config_id().ok_or_else(|| {
            AppError::InvalidState(format!(
                "csp role '{}' does not reference an idp config",
                csp_role.name()
            ))
        })?;
        let role_identifier = csp_role.provider_role_id().ok_or_else(|| {
            AppError::InvalidState(format!(
                "csp role '{}' has no provider role identifier",
                csp_role.name()
            ))
        })?;

        let (config, account) = self.load_active_trust(idp_config_id).await?;
        if config.auth_method() != input.auth_method {
            return Err(AppError::InvalidState(format!(
                "idp config '{}' uses {} but {} was requested",
                config.id(),
                config.auth_method(),
                input.auth_method
            )));
        }
        if account.csp_type() != csp_role.csp_type() {
            return Err(AppError::InvalidState(format!(
                "csp role '{}' is a {} role but idp config '{}' belongs to a {} account",
                csp_role.name(),
                csp_role.csp_type(),
                config.id(),
                account.csp_type()
            )));
        }

        self.federate(
            context,
            actor,
            &config,
            &account,
            role_identifier,
            input.session_name.as_str(),
            normalize_duration(input.duration_seconds),
        )
        .await
    }

    #[allow(clippy::too_many_arguments)]
    pub(super) async fn federate(
        &self,
        context: &CallContext,
        actor: &CallerIdentity,
        config: &CspIdpConfig,
        account: &CspAccount,
        role_identifier: &str,
        session_name: &str,
        duration_seconds: i32,
    ) -> AppResult<TempCredential> {
        if role_identifier.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "role identifier must not be empty".to_owned(),
            ));
        }

        let adapter = self.adapters.adapter(account.csp_type())?;
        let region = account.region().to_owned();

        let issued: IssuedCredentials = match config.trust() {
            IdpTrustConfig::Oidc(trust) => {
                let token = self
                    .identity_broker
                    .client_credentials_token(context)
                    .await?;

                adapter
                    .assume_role_with_web_identity(
                        context,
                        AssumeRoleWithWebIdentityRequest {
                            session: ProviderSession::anonymous(region.clone())
                                .with_endpoint_url(trust.sts_endpoint.clone()),
                            role_arn: role_identifier.to_owned(),
                            session_name: session_name.to_owned(),
                            web_identity_token: token.access_token,
                            duration_seconds,
                        },
                    )
                    .await?
            }
            IdpTrustConfig::Saml(trust) => {
                let principal_arn = match &trust.provider {
                    SamlProvider::Aws { saml_provider_arn } => saml_provider_arn.clone(),
                    SamlProvider::Gcp {
                        saml_provider_resource_name,
                        ..
                    } => saml_provider_resource_name.clone(),
                    SamlProvider::Azure { application_id, .. } => application_id.clone(),
                };
                let assertion = self.identity_broker.saml_assertion(context).await?;

                adapter
                    .assume_role_with_saml(
                        context,
                        AssumeRoleWithSamlRequest {
                            session: ProviderSession::anonymous(region.clone()),
                            role_arn: role_identifier.to_owned(),
                            principal_arn,
                            saml_assertion: assertion.assertion,
                            duration_seconds,
                        },
                    )
                    .await?
            }
            IdpTrustConfig::SecretKey(trust) => {
                let credentials = self.static_credentials(trust)?;

                adapter
                    .assume_role(
                        context,
                        AssumeRoleRequest {
                            session: ProviderSession::signed(region.clone(), credentials),
                            role_arn: role_identifier.to_owned(),
                            session_name: session_name.to_owned(),
                            duration_seconds,
                        },
                    )
                    .await?
            }
        };

        let credential = TempCredential {
            provider: account.csp_type(),
            auth_type: TempCredential::label_for(config.auth_method()),
            access_key_id: issued.access_key_id,
            secret_access_key: issued.secret_access_key,
            session_token: issued.session_token,
            region,
            issued_at: Utc::now(),
            expires_at: issued.expires_at,
            is_active: true,
        };

        let detail = serde_json::json!({
            "role_identifier": role_identifier,
            "auth_method": config.auth_method().as_str(),
            "csp_type": account.csp_type().as_str(),
            "duration_seconds": duration_seconds,
            "expires_at": credential.expires_at.to_rfc3339(),
        })
        .to_string();

        self.audit_repository
            .append_event(AuditEvent::new(
                actor,
                AuditAction::CredentialIssued,
                "csp_idp_config",
                config.id().to_string(),
                Some(detail),
            ))
            .await?;

        info!(
            idp_config_id = %config.id(),
            auth_method = %config.auth_method(),
            csp_type = %account.csp_type(),
            role_identifier,
            expires_at = %credential.expires_at,
            "temporary credential issued"
        );

        Ok(credential)
    }
}
