use async_trait::async_trait;
use cloudtrust_core::{AppResult, CallContext};

/// Access token returned by the identity broker's client-credentials grant.
#[derive(Clone, PartialEq, Eq)]
pub struct BrokerToken {
    /// Bearer token presented to the provider as a web identity token.
    pub access_token: String,
    /// Token type reported by the broker.
    pub token_type: String,
    /// Lifetime in seconds, when reported.
    pub expires_in: Option<u64>,
}

impl std::fmt::Debug for BrokerToken {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BrokerToken")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Base64-encoded SAML response issued by the identity broker.
#[derive(Clone, PartialEq, Eq)]
pub struct SamlAssertion {
    /// Encoded assertion as the provider expects it.
    pub assertion: String,
}

impl std::fmt::Debug for SamlAssertion {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SamlAssertion")
            .field("assertion", &"<redacted>")
            .finish()
    }
}

/// Port for the external identity broker trusted by the providers.
#[async_trait]
pub trait IdentityBroker: Send + Sync {
    /// Obtains a token through the client-credentials grant.
    async fn client_credentials_token(&self, context: &CallContext) -> AppResult<BrokerToken>;

    /// Obtains a SAML assertion for the service principal.
    async fn saml_assertion(&self, context: &CallContext) -> AppResult<SamlAssertion>;
}

/// Port for encrypting and decrypting static provider secrets at rest.
pub trait SecretEncryptor: Send + Sync {
    /// Encrypts a secret into its stored text form.
    fn encrypt(&self, plaintext: &str) -> AppResult<String>;

    /// Decrypts a stored secret.
    fn decrypt(&self, ciphertext: &str) -> AppResult<String>;
}
