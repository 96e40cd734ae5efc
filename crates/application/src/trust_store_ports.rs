mod filters;
mod inputs;
mod repositories;

pub use filters::{CspAccountFilter, CspIdpConfigFilter, CspPolicyFilter, CspRoleFilter};
pub use inputs::{
    CreateCspAccountInput, CreateCspIdpConfigInput, CreateCspPolicyInput, CreateCspRoleInput,
    UpdateCspAccountInput, UpdateCspIdpConfigInput, UpdateCspPolicyInput,
};
pub use repositories::{
    CspAccountRepository, CspIdpConfigRepository, CspPolicyRepository, CspRoleRepository,
};
