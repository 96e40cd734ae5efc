//! Application services and ports.

#![forbid(unsafe_code)]

mod audit_ports;
mod broker_ports;
mod credential_issuance_service;
mod policy_sync_service;
pub mod provider_ports;
mod role_mapping_ports;
mod role_mapping_service;
mod trust_store_ports;
mod trust_store_service;

#[cfg(test)]
mod test_fakes;

pub use audit_ports::{AuditEvent, AuditRepository};
pub use broker_ports::{BrokerToken, IdentityBroker, SamlAssertion, SecretEncryptor};
pub use credential_issuance_service::{
    CONNECTION_TEST_DURATION_SECONDS, ConnectionTestReport, CredentialIssuanceService,
    DEFAULT_CREDENTIAL_DURATION_SECONDS, IssueCredentialInput, IssueRoleCredentialInput,
    normalize_duration,
};
pub use policy_sync_service::{
    POLICY_GET_DURATION_SECONDS, POLICY_GET_SESSION_NAME, POLICY_SYNC_DURATION_SECONDS,
    POLICY_SYNC_SESSION_NAME, PolicySyncReport, PolicySyncService,
};
pub use provider_ports::{CloudProviderAdapter, ProviderAdapterRegistry};
pub use role_mapping_ports::{
    CreateRoleMasterInput, RoleMappingRepository, RoleMasterRepository, RoleSelector,
    UpsertRoleMappingInput,
};
pub use role_mapping_service::RoleMappingService;
pub use trust_store_ports::{
    CreateCspAccountInput, CreateCspIdpConfigInput, CreateCspPolicyInput, CreateCspRoleInput,
    CspAccountFilter, CspAccountRepository, CspIdpConfigFilter, CspIdpConfigRepository,
    CspPolicyFilter, CspPolicyRepository, CspRoleFilter, CspRoleRepository,
    UpdateCspAccountInput, UpdateCspIdpConfigInput, UpdateCspPolicyInput,
};
pub use trust_store_service::TrustStoreService;
