use std::sync::Arc;

use cloudtrust_core::{AppError, AppResult, CallerIdentity};
use cloudtrust_domain::{
    AuditAction, AuthMethod, CspAccountId, CspRole, CspRoleId, CspType, RoleCspRoleMapping,
    RoleId, RoleMaster, RoleMasterInput, RoleScope,
};
use tracing::info;

use crate::role_mapping_ports::{
    CreateRoleMasterInput, RoleMappingRepository, RoleMasterRepository, RoleSelector,
    UpsertRoleMappingInput,
};
use crate::trust_store_ports::CspRoleRepository;
use crate::{AuditEvent, AuditRepository};

mod mappings;
mod roles;

/// Resolves platform roles into CSP roles and maintains the mapping graph.
#[derive(Clone)]
pub struct RoleMappingService {
    role_repository: Arc<dyn RoleMasterRepository>,
    mapping_repository: Arc<dyn RoleMappingRepository>,
    csp_role_repository: Arc<dyn CspRoleRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RoleMappingService {
    /// Creates a new role mapping service.
    #[must_use]
    pub fn new(
        role_repository: Arc<dyn RoleMasterRepository>,
        mapping_repository: Arc<dyn RoleMappingRepository>,
        csp_role_repository: Arc<dyn CspRoleRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            role_repository,
            mapping_repository,
            csp_role_repository,
            audit_repository,
        }
    }
}
