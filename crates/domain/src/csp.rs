use std::str::FromStr;

use cloudtrust_core::AppError;
use serde::{Deserialize, Serialize};

/// Cloud service provider families supported by the trust engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CspType {
    /// Amazon Web Services.
    Aws,
    /// Google Cloud Platform.
    Gcp,
    /// Microsoft Azure.
    Azure,
}

impl CspType {
    /// Returns a stable storage value for this provider.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Gcp => "gcp",
            Self::Azure => "azure",
        }
    }

    /// Returns all known providers.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[CspType] = &[CspType::Aws, CspType::Gcp, CspType::Azure];

        ALL
    }
}

impl FromStr for CspType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "aws" => Ok(Self::Aws),
            "gcp" => Ok(Self::Gcp),
            "azure" => Ok(Self::Azure),
            _ => Err(AppError::InvalidArgument(format!(
                "unknown csp type value '{value}'"
            ))),
        }
    }
}

impl std::fmt::Display for CspType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Trust method used to federate into a CSP role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AuthMethod {
    /// Web identity federation with a broker-issued OIDC token.
    #[serde(rename = "OIDC")]
    Oidc,
    /// SAML 2.0 federation with a broker-issued assertion.
    #[serde(rename = "SAML")]
    Saml,
    /// Long-lived static access keys used as the calling identity.
    #[serde(rename = "SECRET_KEY")]
    SecretKey,
}

impl AuthMethod {
    /// Returns a stable storage value for this trust method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Oidc => "OIDC",
            Self::Saml => "SAML",
            Self::SecretKey => "SECRET_KEY",
        }
    }

    /// Returns the lowercase label reported on issued credentials.
    #[must_use]
    pub fn credential_label(&self) -> &'static str {
        match self {
            Self::Oidc => "oidc",
            Self::Saml => "saml",
            Self::SecretKey => "secret_key",
        }
    }

    /// Returns all known trust methods.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[AuthMethod] = &[AuthMethod::Oidc, AuthMethod::Saml, AuthMethod::SecretKey];

        ALL
    }
}

impl FromStr for AuthMethod {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "OIDC" => Ok(Self::Oidc),
            "SAML" => Ok(Self::Saml),
            "SECRET_KEY" => Ok(Self::SecretKey),
            _ => Err(AppError::InvalidArgument(format!(
                "unknown auth method value '{value}'"
            ))),
        }
    }
}

impl std::fmt::Display for AuthMethod {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}
