use cloudtrust_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::account::trim_optional;
use crate::{CspAccountId, CspIdpConfigId, CspRoleId, CspType};

/// Shortest session most providers accept, in seconds.
pub const MIN_SESSION_DURATION_SECONDS: i32 = 900;
/// Longest session AWS allows a role to declare, in seconds.
pub const MAX_SESSION_DURATION_SECONDS: i32 = 43_200;

/// A CSP-native role that internal roles can be realized by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CspRole {
    id: CspRoleId,
    name: NonEmptyString,
    description: Option<String>,
    csp_type: CspType,
    idp_identifier: Option<String>,
    provider_role_id: Option<String>,
    status: String,
    max_session_duration: Option<i32>,
    path: Option<String>,
    csp_account_id: Option<CspAccountId>,
    csp_idp_config_id: Option<CspIdpConfigId>,
    extended_config: Map<String, Value>,
}

/// Input payload used to construct a validated CSP role.
#[derive(Debug, Clone, PartialEq)]
pub struct CspRoleInput {
    /// Stable role identifier.
    pub id: CspRoleId,
    /// Role name, unique per CSP type.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Provider family.
    pub csp_type: CspType,
    /// Identifier the identity broker knows the role by.
    pub idp_identifier: Option<String>,
    /// Provider-side role identifier such as an IAM role ARN.
    pub provider_role_id: Option<String>,
    /// Lifecycle status label; blank means `active`.
    pub status: Option<String>,
    /// Upper bound for sessions issued against the role.
    pub max_session_duration: Option<i32>,
    /// Provider path prefix.
    pub path: Option<String>,
    /// Owning account.
    pub csp_account_id: Option<CspAccountId>,
    /// IdP configuration used when issuing credentials for the role.
    pub csp_idp_config_id: Option<CspIdpConfigId>,
    /// Provider-specific settings kept as given.
    pub extended_config: Map<String, Value>,
}

impl CspRole {
    /// Creates a validated CSP role.
    pub fn new(input: CspRoleInput) -> AppResult<Self> {
        let CspRoleInput {
            id,
            name,
            description,
            csp_type,
            idp_identifier,
            provider_role_id,
            status,
            max_session_duration,
            path,
            csp_account_id,
            csp_idp_config_id,
            extended_config,
        } = input;

        if let Some(duration) = max_session_duration
            && !(MIN_SESSION_DURATION_SECONDS..=MAX_SESSION_DURATION_SECONDS).contains(&duration)
        {
            return Err(AppError::InvalidArgument(format!(
                "max_session_duration must be between {MIN_SESSION_DURATION_SECONDS} and {MAX_SESSION_DURATION_SECONDS} seconds, got {duration}"
            )));
        }

        Ok(Self {
            id,
            name: NonEmptyString::new(name.trim())?,
            description: trim_optional(description),
            csp_type,
            idp_identifier: trim_optional(idp_identifier),
            provider_role_id: trim_optional(provider_role_id),
            status: trim_optional(status).unwrap_or_else(|| "active".to_owned()),
            max_session_duration,
            path: trim_optional(path),
            csp_account_id,
            csp_idp_config_id,
            extended_config,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> CspRoleId {
        self.id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the provider family.
    #[must_use]
    pub fn csp_type(&self) -> CspType {
        self.csp_type
    }

    /// Returns the identity-broker-side identifier.
    #[must_use]
    pub fn idp_identifier(&self) -> Option<&str> {
        self.idp_identifier.as_deref()
    }

    /// Returns the provider-side role identifier.
    #[must_use]
    pub fn provider_role_id(&self) -> Option<&str> {
        self.provider_role_id.as_deref()
    }

    /// Returns the lifecycle status label.
    #[must_use]
    pub fn status(&self) -> &str {
        self.status.as_str()
    }

    /// Returns the session duration bound.
    #[must_use]
    pub fn max_session_duration(&self) -> Option<i32> {
        self.max_session_duration
    }

    /// Returns the provider path prefix.
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Returns the owning account.
    #[must_use]
    pub fn csp_account_id(&self) -> Option<CspAccountId> {
        self.csp_account_id
    }

    /// Returns the IdP configuration bound to the role.
    #[must_use]
    pub fn csp_idp_config_id(&self) -> Option<CspIdpConfigId> {
        self.csp_idp_config_id
    }

    /// Returns provider-specific settings.
    #[must_use]
    pub fn extended_config(&self) -> &Map<String, Value> {
        &self.extended_config
    }
}
