mod adapter;
mod policies;
mod registry;
mod roles;
mod session;

pub use adapter::CloudProviderAdapter;
pub use policies::{
    CreateProviderPolicyInput, PolicyListFilter, PolicyListScope, PolicyPage, ProviderPolicy,
};
pub use registry::ProviderAdapterRegistry;
pub use roles::{
    CreateProviderRoleInput, ProviderAttachedPolicy, ProviderRole, UpdateProviderRoleInput,
};
pub use session::{
    AssumeRoleRequest, AssumeRoleWithSamlRequest, AssumeRoleWithWebIdentityRequest,
    IssuedCredentials, ProviderCallerIdentity, ProviderCredentials, ProviderSession,
};
