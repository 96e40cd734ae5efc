//! Keycloak-backed identity broker.
//!
//! Tokens come from the realm's OpenID Connect token endpoint. SAML assertions
//! are obtained by exchanging a client-credentials token for a SAML 2.0 token.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

use cloudtrust_application::{BrokerToken, IdentityBroker, SamlAssertion};
use cloudtrust_core::{AppError, AppResult, CallContext};

use crate::deadline::within_deadline;

const TOKEN_EXCHANGE_GRANT: &str = "urn:ietf:params:oauth:grant-type:token-exchange";
const ACCESS_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:access_token";
const SAML2_TOKEN_TYPE: &str = "urn:ietf:params:oauth:token-type:saml2";

/// Connection settings for a Keycloak realm.
#[derive(Clone)]
pub struct KeycloakBrokerConfig {
    /// Keycloak base URL, for example `https://sso.example.com`.
    pub base_url: String,
    /// Realm the service client lives in.
    pub realm: String,
    /// Confidential client id.
    pub client_id: String,
    /// Confidential client secret.
    pub client_secret: String,
    /// Audience requested in SAML token exchange, usually the SAML client id.
    pub saml_audience: Option<String>,
}

impl std::fmt::Debug for KeycloakBrokerConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("KeycloakBrokerConfig")
            .field("base_url", &self.base_url)
            .field("realm", &self.realm)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("saml_audience", &self.saml_audience)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Identity broker talking to Keycloak over HTTP.
pub struct KeycloakIdentityBroker {
    http_client: reqwest::Client,
    token_endpoint: Url,
    config: KeycloakBrokerConfig,
}

impl KeycloakIdentityBroker {
    /// Creates a broker for the configured realm.
    pub fn new(http_client: reqwest::Client, config: KeycloakBrokerConfig) -> AppResult<Self> {
        let token_endpoint = token_endpoint(config.base_url.as_str(), config.realm.as_str())?;

        Ok(Self {
            http_client,
            token_endpoint,
            config,
        })
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        purpose: &str,
    ) -> AppResult<TokenResponse> {
        let response = self
            .http_client
            .post(self.token_endpoint.clone())
            .form(form)
            .send()
            .await
            .map_err(|error| {
                AppError::ProviderUnavailable(format!(
                    "identity broker {purpose} request failed: {error}"
                ))
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(status_error(purpose, status, body.as_str()));
        }

        response.json::<TokenResponse>().await.map_err(|error| {
            AppError::Provider(format!(
                "identity broker returned an unreadable {purpose} response: {error}"
            ))
        })
    }

    async fn client_credentials_token_impl(&self) -> AppResult<BrokerToken> {
        let response = self
            .request_token(
                &[
                    ("grant_type", "client_credentials"),
                    ("client_id", self.config.client_id.as_str()),
                    ("client_secret", self.config.client_secret.as_str()),
                ],
                "client credentials",
            )
            .await?;

        debug!(
            realm = %self.config.realm,
            expires_in = response.expires_in,
            "obtained broker access token"
        );

        Ok(BrokerToken {
            access_token: response.access_token,
            token_type: response.token_type.unwrap_or_else(|| "Bearer".to_owned()),
            expires_in: response.expires_in,
        })
    }

    async fn saml_assertion_impl(&self) -> AppResult<SamlAssertion> {
        let subject = self.client_credentials_token_impl().await?;

        let mut form = vec![
            ("grant_type", TOKEN_EXCHANGE_GRANT),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("subject_token", subject.access_token.as_str()),
            ("subject_token_type", ACCESS_TOKEN_TYPE),
            ("requested_token_type", SAML2_TOKEN_TYPE),
        ];
        if let Some(audience) = self.config.saml_audience.as_deref() {
            form.push(("audience", audience));
        }

        let response = self.request_token(&form, "saml token exchange").await?;
        if response.access_token.trim().is_empty() {
            return Err(AppError::Provider(
                "identity broker returned an empty saml assertion".to_owned(),
            ));
        }

        info!(realm = %self.config.realm, "obtained broker saml assertion");
        Ok(SamlAssertion {
            assertion: response.access_token,
        })
    }
}

#[async_trait]
impl IdentityBroker for KeycloakIdentityBroker {
    async fn client_credentials_token(&self, context: &CallContext) -> AppResult<BrokerToken> {
        within_deadline(
            context,
            "broker client credentials token",
            self.client_credentials_token_impl(),
        )
        .await
    }

    async fn saml_assertion(&self, context: &CallContext) -> AppResult<SamlAssertion> {
        within_deadline(context, "broker saml assertion", self.saml_assertion_impl()).await
    }
}

fn token_endpoint(base_url: &str, realm: &str) -> AppResult<Url> {
    let realm = realm.trim();
    if realm.is_empty() {
        return Err(AppError::InvalidArgument(
            "KEYCLOAK_REALM must not be empty".to_owned(),
        ));
    }

    let mut url = Url::parse(base_url.trim()).map_err(|error| {
        AppError::InvalidArgument(format!("invalid KEYCLOAK_BASE_URL '{base_url}': {error}"))
    })?;

    url.path_segments_mut()
        .map_err(|_| {
            AppError::InvalidArgument(format!(
                "KEYCLOAK_BASE_URL '{base_url}' cannot be used as a base"
            ))
        })?
        .pop_if_empty()
        .extend(["realms", realm, "protocol", "openid-connect", "token"]);

    Ok(url)
}

fn status_error(purpose: &str, status: reqwest::StatusCode, body: &str) -> AppError {
    let message = format!("identity broker {purpose} request failed with status {status}: {body}");

    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        AppError::PermissionDenied(message)
    } else if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        AppError::ProviderUnavailable(message)
    } else {
        AppError::Provider(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_endpoint_appends_realm_path() -> AppResult<()> {
        let url = token_endpoint("https://sso.example.com", "cloudtrust")?;
        assert_eq!(
            url.as_str(),
            "https://sso.example.com/realms/cloudtrust/protocol/openid-connect/token"
        );

        let nested = token_endpoint("https://example.com/auth/", "ops")?;
        assert_eq!(
            nested.as_str(),
            "https://example.com/auth/realms/ops/protocol/openid-connect/token"
        );
        Ok(())
    }

    #[test]
    fn token_endpoint_rejects_bad_settings() {
        assert!(matches!(
            token_endpoint("not a url", "cloudtrust"),
            Err(AppError::InvalidArgument(_))
        ));
        assert!(matches!(
            token_endpoint("https://sso.example.com", "  "),
            Err(AppError::InvalidArgument(_))
        ));
    }

    #[test]
    fn broker_status_codes_map_to_error_kinds() {
        assert!(matches!(
            status_error("client credentials", reqwest::StatusCode::UNAUTHORIZED, ""),
            AppError::PermissionDenied(_)
        ));
        assert!(matches!(
            status_error("client credentials", reqwest::StatusCode::BAD_GATEWAY, ""),
            AppError::ProviderUnavailable(_)
        ));
        assert!(matches!(
            status_error("saml token exchange", reqwest::StatusCode::BAD_REQUEST, "invalid"),
            AppError::Provider(message) if message.contains("invalid")
        ));
    }

    #[test]
    fn token_response_tolerates_missing_optional_fields() {
        let parsed = serde_json::from_str::<TokenResponse>(r#"{"access_token":"abc"}"#);

        assert!(matches!(
            parsed,
            Ok(TokenResponse {
                token_type: None,
                expires_in: None,
                ..
            })
        ));
    }

    #[test]
    fn config_debug_redacts_secret() {
        let config = KeycloakBrokerConfig {
            base_url: "https://sso.example.com".to_owned(),
            realm: "cloudtrust".to_owned(),
            client_id: "cloudtrust-service".to_owned(),
            client_secret: "super-secret".to_owned(),
            saml_audience: None,
        };

        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("cloudtrust-service"));
    }
}
