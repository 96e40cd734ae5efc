use std::collections::BTreeSet;

use cloudtrust_domain::{AuthMethod, CspRoleId, RoleId, RoleScope};

/// Input payload for creating role masters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateRoleMasterInput {
    /// Unique role name.
    pub name: String,
    /// Optional parent role.
    pub parent_id: Option<RoleId>,
    /// Optional description.
    pub description: Option<String>,
    /// Marks a system-provided role.
    pub predefined: bool,
    /// Scope tags stored as role subs.
    pub scopes: BTreeSet<RoleScope>,
}

/// Input payload for adding or re-describing a role to CSP role edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertRoleMappingInput {
    /// Platform role.
    pub role_id: RoleId,
    /// Trust method the edge is valid for.
    pub auth_method: AuthMethod,
    /// Target CSP role.
    pub csp_role_id: CspRoleId,
    /// Description; the only field an upsert changes on an existing edge.
    pub description: Option<String>,
}

/// Identifies a role master either by id or by unique name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleSelector {
    /// Role identifier.
    Id(RoleId),
    /// Unique role name.
    Name(String),
}

impl std::fmt::Display for RoleSelector {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(role_id) => write!(formatter, "{role_id}"),
            Self::Name(name) => formatter.write_str(name),
        }
    }
}
