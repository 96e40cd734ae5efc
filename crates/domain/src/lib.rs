//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod account;
mod audit;
mod credential;
mod csp;
mod csp_role;
mod ids;
mod idp_config;
mod policy;
mod role;

pub use account::{AccountDescriptors, CspAccount, CspAccountInput, DEFAULT_REGION};
pub use audit::AuditAction;
pub use credential::TempCredential;
pub use csp::{AuthMethod, CspType};
pub use csp_role::{
    CspRole, CspRoleInput, MAX_SESSION_DURATION_SECONDS, MIN_SESSION_DURATION_SECONDS,
};
pub use ids::{CspAccountId, CspIdpConfigId, CspPolicyId, CspRoleId, RoleId};
pub use idp_config::{
    CspIdpConfig, CspIdpConfigInput, IdpTrustConfig, OidcProvider, OidcTrust, SamlProvider,
    SamlTrust, SecretKeyTrust, TrustConfigEntries,
};
pub use policy::{CspPolicy, CspPolicyInput, PolicyDocument, PolicyType};
pub use role::{RoleCspRoleMapping, RoleMaster, RoleMasterInput, RoleScope};
