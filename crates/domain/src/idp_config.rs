//! IdP trust configuration attached to a CSP account.
//!
//! Configuration arrives as a string-keyed map whose required keys depend on
//! the (auth method, CSP type) pair. [`IdpTrustConfig::from_entries`] checks
//! that shape once and produces a typed variant; keys it does not recognize
//! are kept verbatim in `extra` and written back by
//! [`IdpTrustConfig::to_entries`].

use std::collections::BTreeMap;

use cloudtrust_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::account::trim_optional;
use crate::{AuthMethod, CspAccountId, CspIdpConfigId, CspType};

/// Raw trust configuration keys as stored and exchanged.
pub type TrustConfigEntries = BTreeMap<String, String>;

const ROLE_ARN: &str = "role_arn";
const AUDIENCE: &str = "audience";
const STS_ENDPOINT: &str = "sts_endpoint";
const SSO_SERVICE_LOCATION: &str = "sso_service_location";
const LEGACY_ASSERTION_ENDPOINT: &str = "assertion_endpoint";
const ISSUER_URL: &str = "issuer_url";
const METADATA_URL: &str = "metadata_url";
const ACCESS_KEY_ID: &str = "access_key_id";
const SECRET_ACCESS_KEY: &str = "secret_access_key";
const ENCRYPTED: &str = "encrypted";

/// Provider-side OIDC trust anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "csp", rename_all = "snake_case")]
pub enum OidcProvider {
    /// IAM OIDC identity provider.
    Aws {
        /// IAM OIDC provider ARN.
        oidc_provider_arn: String,
    },
    /// Workload identity pool provider.
    Gcp {
        /// Full workload identity provider resource name.
        workload_identity_provider: String,
    },
    /// Entra ID app registration with federated credentials.
    Azure {
        /// Directory tenant identifier.
        tenant_id: String,
        /// Application client identifier.
        client_id: String,
    },
}

/// OIDC web identity trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OidcTrust {
    /// Provider-side trust anchor.
    pub provider: OidcProvider,
    /// Optional token audience expected by the provider.
    pub audience: Option<String>,
    /// Optional STS endpoint override.
    pub sts_endpoint: Option<String>,
    /// Optional default role assumed with this configuration.
    pub role_arn: Option<String>,
    /// Keys not interpreted by the trust engine.
    pub extra: TrustConfigEntries,
}

/// Provider-side SAML trust anchor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "csp", rename_all = "snake_case")]
pub enum SamlProvider {
    /// IAM SAML identity provider.
    Aws {
        /// IAM SAML provider ARN used as the assume-role principal.
        saml_provider_arn: String,
    },
    /// Workforce pool SAML provider.
    Gcp {
        /// Full SAML provider resource name.
        saml_provider_resource_name: String,
        /// Audience the assertion is issued for.
        audience: String,
    },
    /// Entra ID enterprise application.
    Azure {
        /// Enterprise application identifier.
        application_id: String,
        /// Directory tenant identifier.
        tenant_id: String,
    },
}

/// SAML federation trust settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamlTrust {
    /// Provider-side trust anchor.
    pub provider: SamlProvider,
    /// Assertion consumer endpoint at the provider.
    pub sso_service_location: String,
    /// Optional issuer URL of the identity broker.
    pub issuer_url: Option<String>,
    /// Optional metadata document URL.
    pub metadata_url: Option<String>,
    /// Optional default role assumed with this configuration.
    pub role_arn: Option<String>,
    /// Keys not interpreted by the trust engine.
    pub extra: TrustConfigEntries,
}

/// Static access key trust settings.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretKeyTrust {
    /// Access key identifier.
    pub access_key_id: String,
    /// Secret access key, ciphertext when `encrypted` is set.
    pub secret_access_key: String,
    /// Whether `secret_access_key` must be decrypted before use.
    pub encrypted: bool,
    /// Optional default role assumed with these keys.
    pub role_arn: Option<String>,
    /// Keys not interpreted by the trust engine.
    pub extra: TrustConfigEntries,
}

impl std::fmt::Debug for SecretKeyTrust {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("SecretKeyTrust")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("encrypted", &self.encrypted)
            .field("role_arn", &self.role_arn)
            .field("extra", &self.extra)
            .finish()
    }
}

/// Trust configuration, one variant per auth method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "auth_method")]
pub enum IdpTrustConfig {
    /// Web identity federation.
    #[serde(rename = "OIDC")]
    Oidc(OidcTrust),
    /// SAML federation.
    #[serde(rename = "SAML")]
    Saml(SamlTrust),
    /// Static key federation.
    #[serde(rename = "SECRET_KEY")]
    SecretKey(SecretKeyTrust),
}

impl IdpTrustConfig {
    /// Validates raw configuration keys for an (auth method, CSP type) pair.
    pub fn from_entries(
        auth_method: AuthMethod,
        csp_type: CspType,
        entries: TrustConfigEntries,
    ) -> AppResult<Self> {
        let mut reader = EntryReader::new(auth_method, csp_type, entries);

        let config = match auth_method {
            AuthMethod::Oidc => {
                let provider = match csp_type {
                    CspType::Aws => OidcProvider::Aws {
                        oidc_provider_arn: reader.required("oidc_provider_arn"),
                    },
                    CspType::Gcp => OidcProvider::Gcp {
                        workload_identity_provider: reader.required("workload_identity_provider"),
                    },
                    CspType::Azure => OidcProvider::Azure {
                        tenant_id: reader.required("tenant_id"),
                        client_id: reader.required("client_id"),
                    },
                };

                Self::Oidc(OidcTrust {
                    provider,
                    audience: reader.optional(AUDIENCE),
                    sts_endpoint: reader.optional(STS_ENDPOINT),
                    role_arn: reader.optional(ROLE_ARN),
                    extra: TrustConfigEntries::new(),
                })
            }
            AuthMethod::Saml => {
                let provider = match csp_type {
                    CspType::Aws => SamlProvider::Aws {
                        saml_provider_arn: reader.required("saml_provider_arn"),
                    },
                    CspType::Gcp => SamlProvider::Gcp {
                        saml_provider_resource_name: reader
                            .required("saml_provider_resource_name"),
                        audience: reader.required(AUDIENCE),
                    },
                    CspType::Azure => SamlProvider::Azure {
                        application_id: reader.required("application_id"),
                        tenant_id: reader.required("tenant_id"),
                    },
                };
                let sso_service_location = reader
                    .optional(SSO_SERVICE_LOCATION)
                    .or_else(|| reader.optional(LEGACY_ASSERTION_ENDPOINT));
                let sso_service_location =
                    reader.require_value(SSO_SERVICE_LOCATION, sso_service_location);

                Self::Saml(SamlTrust {
                    provider,
                    sso_service_location,
                    issuer_url: reader.optional(ISSUER_URL),
                    metadata_url: reader.optional(METADATA_URL),
                    role_arn: reader.optional(ROLE_ARN),
                    extra: TrustConfigEntries::new(),
                })
            }
            AuthMethod::SecretKey => Self::SecretKey(SecretKeyTrust {
                access_key_id: reader.required(ACCESS_KEY_ID),
                secret_access_key: reader.required(SECRET_ACCESS_KEY),
                encrypted: reader.flag(ENCRYPTED)?,
                role_arn: reader.optional(ROLE_ARN),
                extra: TrustConfigEntries::new(),
            }),
        };

        let extra = reader.finish()?;
        Ok(config.with_extra(extra))
    }

    /// Returns the auth method of this configuration.
    #[must_use]
    pub fn auth_method(&self) -> AuthMethod {
        match self {
            Self::Oidc(_) => AuthMethod::Oidc,
            Self::Saml(_) => AuthMethod::Saml,
            Self::SecretKey(_) => AuthMethod::SecretKey,
        }
    }

    /// Returns the CSP type the configuration was validated for, when it is bound to one.
    #[must_use]
    pub fn csp_type(&self) -> Option<CspType> {
        match self {
            Self::Oidc(trust) => Some(match trust.provider {
                OidcProvider::Aws { .. } => CspType::Aws,
                OidcProvider::Gcp { .. } => CspType::Gcp,
                OidcProvider::Azure { .. } => CspType::Azure,
            }),
            Self::Saml(trust) => Some(match trust.provider {
                SamlProvider::Aws { .. } => CspType::Aws,
                SamlProvider::Gcp { .. } => CspType::Gcp,
                SamlProvider::Azure { .. } => CspType::Azure,
            }),
            Self::SecretKey(_) => None,
        }
    }

    /// Returns the configured default role, if any.
    #[must_use]
    pub fn role_arn(&self) -> Option<&str> {
        match self {
            Self::Oidc(trust) => trust.role_arn.as_deref(),
            Self::Saml(trust) => trust.role_arn.as_deref(),
            Self::SecretKey(trust) => trust.role_arn.as_deref(),
        }
    }

    /// Returns keys preserved verbatim from the raw configuration.
    #[must_use]
    pub fn extra(&self) -> &TrustConfigEntries {
        match self {
            Self::Oidc(trust) => &trust.extra,
            Self::Saml(trust) => &trust.extra,
            Self::SecretKey(trust) => &trust.extra,
        }
    }

    /// Converts the configuration back into its raw key form.
    #[must_use]
    pub fn to_entries(&self) -> TrustConfigEntries {
        let mut entries = self.extra().clone();
        let mut put = |key: &str, value: &str| {
            entries.insert(key.to_owned(), value.to_owned());
        };

        match self {
            Self::Oidc(trust) => {
                match &trust.provider {
                    OidcProvider::Aws { oidc_provider_arn } => {
                        put("oidc_provider_arn", oidc_provider_arn);
                    }
                    OidcProvider::Gcp {
                        workload_identity_provider,
                    } => put("workload_identity_provider", workload_identity_provider),
                    OidcProvider::Azure {
                        tenant_id,
                        client_id,
                    } => {
                        put("tenant_id", tenant_id);
                        put("client_id", client_id);
                    }
                }
                put_optional(&mut put, AUDIENCE, trust.audience.as_deref());
                put_optional(&mut put, STS_ENDPOINT, trust.sts_endpoint.as_deref());
                put_optional(&mut put, ROLE_ARN, trust.role_arn.as_deref());
            }
            Self::Saml(trust) => {
                match &trust.provider {
                    SamlProvider::Aws { saml_provider_arn } => {
                        put("saml_provider_arn", saml_provider_arn);
                    }
                    SamlProvider::Gcp {
                        saml_provider_resource_name,
                        audience,
                    } => {
                        put("saml_provider_resource_name", saml_provider_resource_name);
                        put(AUDIENCE, audience);
                    }
                    SamlProvider::Azure {
                        application_id,
                        tenant_id,
                    } => {
                        put("application_id", application_id);
                        put("tenant_id", tenant_id);
                    }
                }
                put(SSO_SERVICE_LOCATION, trust.sso_service_location.as_str());
                put_optional(&mut put, ISSUER_URL, trust.issuer_url.as_deref());
                put_optional(&mut put, METADATA_URL, trust.metadata_url.as_deref());
                put_optional(&mut put, ROLE_ARN, trust.role_arn.as_deref());
            }
            Self::SecretKey(trust) => {
                put(ACCESS_KEY_ID, trust.access_key_id.as_str());
                put(SECRET_ACCESS_KEY, trust.secret_access_key.as_str());
                put(ENCRYPTED, if trust.encrypted { "true" } else { "false" });
                put_optional(&mut put, ROLE_ARN, trust.role_arn.as_deref());
            }
        }

        entries
    }

    fn with_extra(mut self, extra: TrustConfigEntries) -> Self {
        match &mut self {
            Self::Oidc(trust) => trust.extra = extra,
            Self::Saml(trust) => trust.extra = extra,
            Self::SecretKey(trust) => trust.extra = extra,
        }
        self
    }
}

fn put_optional(put: &mut impl FnMut(&str, &str), key: &str, value: Option<&str>) {
    if let Some(value) = value {
        put(key, value);
    }
}

struct EntryReader {
    auth_method: AuthMethod,
    csp_type: CspType,
    entries: TrustConfigEntries,
    missing: Vec<&'static str>,
}

impl EntryReader {
    fn new(auth_method: AuthMethod, csp_type: CspType, entries: TrustConfigEntries) -> Self {
        let entries = entries
            .into_iter()
            .map(|(key, value)| (key.trim().to_owned(), value))
            .filter(|(key, _)| !key.is_empty())
            .collect();

        Self {
            auth_method,
            csp_type,
            entries,
            missing: Vec::new(),
        }
    }

    fn optional(&mut self, key: &str) -> Option<String> {
        self.entries
            .remove(key)
            .and_then(|value| trim_optional(Some(value)))
    }

    fn required(&mut self, key: &'static str) -> String {
        let value = self.optional(key);
        self.require_value(key, value)
    }

    fn require_value(&mut self, key: &'static str, value: Option<String>) -> String {
        value.unwrap_or_else(|| {
            self.missing.push(key);
            String::new()
        })
    }

    fn flag(&mut self, key: &str) -> AppResult<bool> {
        match self.optional(key) {
            None => Ok(false),
            Some(value) => match value.to_ascii_lowercase().as_str() {
                "true" => Ok(true),
                "false" => Ok(false),
                _ => Err(AppError::InvalidArgument(format!(
                    "trust configuration key '{key}' must be 'true' or 'false', got '{value}'"
                ))),
            },
        }
    }

    fn finish(self) -> AppResult<TrustConfigEntries> {
        if !self.missing.is_empty() {
            return Err(AppError::InvalidArgument(format!(
                "{} trust configuration for {} requires keys: {}",
                self.auth_method,
                self.csp_type,
                self.missing.join(", ")
            )));
        }

        Ok(self.entries)
    }
}

/// One trust configuration attached to a CSP account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CspIdpConfig {
    id: CspIdpConfigId,
    name: NonEmptyString,
    csp_account_id: CspAccountId,
    trust: IdpTrustConfig,
    description: Option<String>,
    is_active: bool,
}

/// Input payload used to construct a validated IdP configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspIdpConfigInput {
    /// Stable configuration identifier.
    pub id: CspIdpConfigId,
    /// Name, unique per account.
    pub name: String,
    /// Owning account.
    pub csp_account_id: CspAccountId,
    /// CSP type of the owning account, used to pick required keys.
    pub csp_type: CspType,
    /// Trust method.
    pub auth_method: AuthMethod,
    /// Raw method-specific configuration keys.
    pub config: TrustConfigEntries,
    /// Optional description.
    pub description: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

impl CspIdpConfig {
    /// Creates a validated IdP configuration.
    pub fn new(input: CspIdpConfigInput) -> AppResult<Self> {
        let CspIdpConfigInput {
            id,
            name,
            csp_account_id,
            csp_type,
            auth_method,
            config,
            description,
            is_active,
        } = input;

        Ok(Self {
            id,
            name: NonEmptyString::new(name.trim())?,
            csp_account_id,
            trust: IdpTrustConfig::from_entries(auth_method, csp_type, config)?,
            description: trim_optional(description),
            is_active,
        })
    }

    /// Returns the configuration identifier.
    #[must_use]
    pub fn id(&self) -> CspIdpConfigId {
        self.id
    }

    /// Returns the configuration name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning account.
    #[must_use]
    pub fn csp_account_id(&self) -> CspAccountId {
        self.csp_account_id
    }

    /// Returns the trust method.
    #[must_use]
    pub fn auth_method(&self) -> AuthMethod {
        self.trust.auth_method()
    }

    /// Returns the validated trust settings.
    #[must_use]
    pub fn trust(&self) -> &IdpTrustConfig {
        &self.trust
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the configuration may be used for issuance.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns a copy with a new active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Replaces a plaintext static secret with the output of `encrypt` and marks it encrypted.
    ///
    /// Federated methods and secrets already stored encrypted are returned unchanged.
    pub fn seal_secret(
        mut self,
        encrypt: impl FnOnce(&str) -> AppResult<String>,
    ) -> AppResult<Self> {
        if let IdpTrustConfig::SecretKey(trust) = &mut self.trust
            && !trust.encrypted
        {
            trust.secret_access_key = encrypt(trust.secret_access_key.as_str())?;
            trust.encrypted = true;
        }

        Ok(self)
    }
}
