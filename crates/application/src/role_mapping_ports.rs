mod inputs;
mod repositories;

pub use inputs::{CreateRoleMasterInput, RoleSelector, UpsertRoleMappingInput};
pub use repositories::{RoleMappingRepository, RoleMasterRepository};
