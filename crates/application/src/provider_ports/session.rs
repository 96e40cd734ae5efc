use chrono::{DateTime, Utc};
use cloudtrust_domain::TempCredential;

/// Key material used to sign provider calls.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredentials {
    /// Access key identifier.
    pub access_key_id: String,
    /// Secret access key, already decrypted.
    pub secret_access_key: String,
    /// Session token for temporary keys.
    pub session_token: Option<String>,
}

impl std::fmt::Debug for ProviderCredentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ProviderCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("has_session_token", &self.session_token.is_some())
            .finish()
    }
}

/// Where and as whom a provider call is made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSession {
    /// Provider region.
    pub region: String,
    /// Calling identity; `None` for unsigned federation calls.
    pub credentials: Option<ProviderCredentials>,
    /// Optional service endpoint override.
    pub endpoint_url: Option<String>,
}

impl ProviderSession {
    /// Creates an anonymous session in a region.
    #[must_use]
    pub fn anonymous(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            credentials: None,
            endpoint_url: None,
        }
    }

    /// Creates a session signed with the given credentials.
    #[must_use]
    pub fn signed(region: impl Into<String>, credentials: ProviderCredentials) -> Self {
        Self {
            region: region.into(),
            credentials: Some(credentials),
            endpoint_url: None,
        }
    }

    /// Creates a session signed with a previously issued temporary credential.
    #[must_use]
    pub fn from_temp_credential(credential: &TempCredential) -> Self {
        Self::signed(
            credential.region.clone(),
            ProviderCredentials {
                access_key_id: credential.access_key_id.clone(),
                secret_access_key: credential.secret_access_key.clone(),
                session_token: Some(credential.session_token.clone()),
            },
        )
    }

    /// Overrides the service endpoint.
    #[must_use]
    pub fn with_endpoint_url(mut self, endpoint_url: Option<String>) -> Self {
        self.endpoint_url = endpoint_url;
        self
    }
}

/// Web identity federation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleWithWebIdentityRequest {
    /// Region and optional endpoint; credentials are ignored.
    pub session: ProviderSession,
    /// Role to assume.
    pub role_arn: String,
    /// Session name recorded by the provider.
    pub session_name: String,
    /// Broker-issued token.
    pub web_identity_token: String,
    /// Requested lifetime in seconds.
    pub duration_seconds: i32,
}

/// SAML federation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleWithSamlRequest {
    /// Region and optional endpoint; credentials are ignored.
    pub session: ProviderSession,
    /// Role to assume.
    pub role_arn: String,
    /// Provider-side SAML identity provider.
    pub principal_arn: String,
    /// Base64 SAML response.
    pub saml_assertion: String,
    /// Requested lifetime in seconds.
    pub duration_seconds: i32,
}

/// Assume-role request signed by static credentials in `session`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    /// Signed session acting as the caller.
    pub session: ProviderSession,
    /// Role to assume.
    pub role_arn: String,
    /// Session name recorded by the provider.
    pub session_name: String,
    /// Requested lifetime in seconds.
    pub duration_seconds: i32,
}

/// Temporary key material returned by a federation call.
#[derive(Clone, PartialEq, Eq)]
pub struct IssuedCredentials {
    /// Temporary access key identifier.
    pub access_key_id: String,
    /// Temporary secret access key.
    pub secret_access_key: String,
    /// Session token.
    pub session_token: String,
    /// Provider-reported expiry.
    pub expires_at: DateTime<Utc>,
}

impl std::fmt::Debug for IssuedCredentials {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("IssuedCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Identity the provider resolved for a signed session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderCallerIdentity {
    /// Provider account.
    pub account: Option<String>,
    /// Caller principal identifier.
    pub arn: Option<String>,
    /// Caller unique id.
    pub user_id: Option<String>,
}
