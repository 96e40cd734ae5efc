use aws_sdk_sts::types::Credentials as StsCredentials;
use tracing::info;

use super::*;

fn issued_credentials(
    operation: &str,
    credentials: Option<&StsCredentials>,
) -> AppResult<IssuedCredentials> {
    let credentials = credentials.ok_or_else(|| {
        AppError::Provider(format!("{operation} returned no credentials"))
    })?;
    let expires_at = to_utc(credentials.expiration()).ok_or_else(|| {
        AppError::Provider(format!("{operation} returned an out of range expiration"))
    })?;

    Ok(IssuedCredentials {
        access_key_id: credentials.access_key_id().to_owned(),
        secret_access_key: credentials.secret_access_key().to_owned(),
        session_token: credentials.session_token().to_owned(),
        expires_at,
    })
}

impl AwsProviderAdapter {
    pub(super) async fn assume_role_with_web_identity_impl(
        &self,
        request: AssumeRoleWithWebIdentityRequest,
    ) -> AppResult<IssuedCredentials> {
        let client = self.sts_client(&request.session, true).await;
        let response = client
            .assume_role_with_web_identity()
            .role_arn(request.role_arn.as_str())
            .role_session_name(request.session_name.as_str())
            .web_identity_token(request.web_identity_token)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(|error| map_sdk_error("assume_role_with_web_identity", error))?;

        let issued = issued_credentials("assume_role_with_web_identity", response.credentials())?;
        info!(
            role_arn = %request.role_arn,
            expires_at = %issued.expires_at,
            "assumed aws role with web identity"
        );

        Ok(issued)
    }

    pub(super) async fn assume_role_with_saml_impl(
        &self,
        request: AssumeRoleWithSamlRequest,
    ) -> AppResult<IssuedCredentials> {
        let client = self.sts_client(&request.session, true).await;
        let response = client
            .assume_role_with_saml()
            .role_arn(request.role_arn.as_str())
            .principal_arn(request.principal_arn.as_str())
            .saml_assertion(request.saml_assertion)
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(|error| map_sdk_error("assume_role_with_saml", error))?;

        let issued = issued_credentials("assume_role_with_saml", response.credentials())?;
        info!(
            role_arn = %request.role_arn,
            expires_at = %issued.expires_at,
            "assumed aws role with saml"
        );

        Ok(issued)
    }

    pub(super) async fn assume_role_impl(
        &self,
        request: AssumeRoleRequest,
    ) -> AppResult<IssuedCredentials> {
        if request.session.credentials.is_none() {
            return Err(AppError::InvalidArgument(
                "assume_role requires a signed session".to_owned(),
            ));
        }

        let client = self.sts_client(&request.session, false).await;
        let response = client
            .assume_role()
            .role_arn(request.role_arn.as_str())
            .role_session_name(request.session_name.as_str())
            .duration_seconds(request.duration_seconds)
            .send()
            .await
            .map_err(|error| map_sdk_error("assume_role", error))?;

        let issued = issued_credentials("assume_role", response.credentials())?;
        info!(
            role_arn = %request.role_arn,
            expires_at = %issued.expires_at,
            "assumed aws role with static credentials"
        );

        Ok(issued)
    }

    pub(super) async fn verify_caller_identity_impl(
        &self,
        session: &ProviderSession,
    ) -> AppResult<ProviderCallerIdentity> {
        let client = self.sts_client(session, false).await;
        let response = client
            .get_caller_identity()
            .send()
            .await
            .map_err(|error| map_sdk_error("verify_caller_identity", error))?;

        Ok(ProviderCallerIdentity {
            account: response.account().map(str::to_owned),
            arn: response.arn().map(str::to_owned),
            user_id: response.user_id().map(str::to_owned),
        })
    }
}
