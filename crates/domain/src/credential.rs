use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AuthMethod, CspType};

/// Temporary provider credential handed to the caller and never stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempCredential {
    /// Provider that issued the credential.
    pub provider: CspType,
    /// Credential label of the trust method used, such as `secret_key`.
    pub auth_type: String,
    /// Temporary access key identifier.
    pub access_key_id: String,
    /// Temporary secret access key.
    pub secret_access_key: String,
    /// Session token bound to the key pair.
    pub session_token: String,
    /// Region the credential was requested for.
    pub region: String,
    /// Issue time recorded locally.
    pub issued_at: DateTime<Utc>,
    /// Expiry as reported by the provider.
    pub expires_at: DateTime<Utc>,
    /// Always true on issue; expiry is enforced by the provider.
    pub is_active: bool,
}

impl TempCredential {
    /// Returns the trust method label used for issuance.
    #[must_use]
    pub fn label_for(auth_method: AuthMethod) -> String {
        auth_method.credential_label().to_owned()
    }
}

impl std::fmt::Debug for TempCredential {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("TempCredential")
            .field("provider", &self.provider)
            .field("auth_type", &self.auth_type)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("session_token", &"<redacted>")
            .field("region", &self.region)
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .field("is_active", &self.is_active)
            .finish()
    }
}
