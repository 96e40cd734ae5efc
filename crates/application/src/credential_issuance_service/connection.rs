use super::*;

const CONNECTION_TEST_SESSION_NAME: &str = "cloudtrust-connection-test";

impl CredentialIssuanceService {
    /// Exercises a trust configuration against its provider.
    ///
    /// OIDC configurations issue a short credential for their `role_arn`;
    /// SECRET_KEY configurations resolve the caller identity of their keys.
    pub async fn test_connection(
        &self,
        context: &CallContext,
        actor: &CallerIdentity,
        idp_config_id: CspIdpConfigId,
    ) -> AppResult<ConnectionTestReport> {
        let (config, account) = self.load_active_trust(idp_config_id).await?;

        match config.trust() {
            IdpTrustConfig::Oidc(trust) => {
                let role_arn = trust.role_arn.as_deref().ok_or_else(|| {
                    AppError::InvalidState(format!(
                        "idp config '{idp_config_id}' has no role_arn to test against"
                    ))
                })?;

                let credential = self
                    .federate(
                        context,
                        actor,
                        &config,
                        &account,
                        role_arn,
                        CONNECTION_TEST_SESSION_NAME,
                        CONNECTION_TEST_DURATION_SECONDS,
                    )
                    .await?;

                Ok(ConnectionTestReport {
                    auth_method: AuthMethod::Oidc,
                    caller: None,
                    credential_expires_at: Some(credential.expires_at),
                })
            }
            IdpTrustConfig::SecretKey(trust) => {
                let session =
                    ProviderSession::signed(account.region(), self.static_credentials(trust)?);

                let caller = self
                    .adapters
                    .adapter(account.csp_type())?
                    .verify_caller_identity(context, &session)
                    .await?;

                info!(
                    idp_config_id = %idp_config_id,
                    account = caller.account.as_deref().unwrap_or_default(),
                    "static key connection verified"
                );

                Ok(ConnectionTestReport {
                    auth_method: AuthMethod::SecretKey,
                    caller: Some(caller),
                    credential_expires_at: None,
                })
            }
            IdpTrustConfig::Saml(_) => Err(AppError::Unimplemented(
                "connection tests are not available for SAML trust configurations".to_owned(),
            )),
        }
    }
}
