use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use cloudtrust_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::account::trim_optional;
use crate::{AuthMethod, CspRoleId, RoleId};

/// Scope tag carried by a role master through its sub rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleScope {
    /// Usable for platform administration.
    Platform,
    /// Usable inside workspaces.
    Workspace,
    /// Usable as the source of a CSP role mapping.
    Csp,
}

impl RoleScope {
    /// Returns a stable storage value for this scope.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Platform => "platform",
            Self::Workspace => "workspace",
            Self::Csp => "csp",
        }
    }
}

impl FromStr for RoleScope {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "platform" => Ok(Self::Platform),
            "workspace" => Ok(Self::Workspace),
            "csp" => Ok(Self::Csp),
            _ => Err(AppError::InvalidArgument(format!(
                "unknown role scope value '{value}'"
            ))),
        }
    }
}

/// Internal role, optionally parented, tagged with the scopes it is usable at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleMaster {
    id: RoleId,
    parent_id: Option<RoleId>,
    name: NonEmptyString,
    description: Option<String>,
    predefined: bool,
    scopes: BTreeSet<RoleScope>,
}

/// Input payload used to construct a validated role master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleMasterInput {
    /// Stable role identifier.
    pub id: RoleId,
    /// Optional parent role.
    pub parent_id: Option<RoleId>,
    /// Unique role name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Whether the role ships with the platform.
    pub predefined: bool,
    /// Scope tags; at least one is required.
    pub scopes: BTreeSet<RoleScope>,
}

impl RoleMaster {
    /// Creates a validated role master.
    pub fn new(input: RoleMasterInput) -> AppResult<Self> {
        let RoleMasterInput {
            id,
            parent_id,
            name,
            description,
            predefined,
            scopes,
        } = input;

        if parent_id == Some(id) {
            return Err(AppError::InvalidArgument(format!(
                "role '{id}' cannot be its own parent"
            )));
        }

        if scopes.is_empty() {
            return Err(AppError::InvalidArgument(
                "role must carry at least one scope".to_owned(),
            ));
        }

        Ok(Self {
            id,
            parent_id,
            name: NonEmptyString::new(name.trim())?,
            description: trim_optional(description),
            predefined,
            scopes,
        })
    }

    /// Returns the role identifier.
    #[must_use]
    pub fn id(&self) -> RoleId {
        self.id
    }

    /// Returns the parent role, if any.
    #[must_use]
    pub fn parent_id(&self) -> Option<RoleId> {
        self.parent_id
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

    /// Returns whether the role ships with the platform.
    #[must_use]
    pub fn predefined(&self) -> bool {
        self.predefined
    }

    /// Returns all scope tags.
    #[must_use]
    pub fn scopes(&self) -> &BTreeSet<RoleScope> {
        &self.scopes
    }

    /// Returns true when the role carries the given scope.
    #[must_use]
    pub fn has_scope(&self, scope: RoleScope) -> bool {
        self.scopes.contains(&scope)
    }

    /// Checks that the role can be mapped to CSP roles.
    pub fn ensure_csp_mappable(&self) -> AppResult<()> {
        if !self.has_scope(RoleScope::Csp) {
            return Err(AppError::InvalidState(format!(
                "role '{}' has no csp scope and cannot be mapped to csp roles",
                self.name
            )));
        }

        Ok(())
    }
}

/// Mapping edge between an internal role and a CSP role under one trust method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCspRoleMapping {
    /// Internal role.
    pub role_id: RoleId,
    /// Trust method the edge applies to.
    pub auth_method: AuthMethod,
    /// Target CSP role.
    pub csp_role_id: CspRoleId,
    /// Optional description; the only mutable part of the edge.
    pub description: Option<String>,
    /// Timestamp of the first insert.
    pub created_at: DateTime<Utc>,
}
