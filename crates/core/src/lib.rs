//! Shared primitives for all Rust crates in Cloudtrust.

#![forbid(unsafe_code)]

/// Caller identity attached to administrative and issuance requests.
pub mod auth;
/// Deadline-bound call context for outbound provider and broker calls.
pub mod context;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use auth::CallerIdentity;
pub use context::CallContext;

/// Result type used across Cloudtrust crates.
pub type AppResult<T> = Result<T, AppError>;

/// A validated non-empty UTF-8 string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    /// Creates a validated non-empty string.
    pub fn new(value: impl Into<String>) -> AppResult<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(AppError::InvalidArgument(
                "value must not be empty or whitespace".to_owned(),
            ));
        }

        Ok(Self(value))
    }

    /// Returns the underlying string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.0.as_str())
    }
}

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed input, including required trust configuration keys.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write would violate a uniqueness invariant.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Resource exists but is not usable in its current state.
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Delete is blocked by resources that still reference the target.
    #[error("dependents exist: {0}")]
    DependentsExist(String),

    /// Provider or broker rejected the caller's identity or permissions.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Cloud provider or identity broker returned a failure.
    #[error("provider error: {0}")]
    Provider(String),

    /// Cloud provider or identity broker could not be reached in time.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Capability is not backed for the requested provider.
    #[error("unimplemented: {0}")]
    Unimplemented(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns true when the failure originated at a provider or broker boundary.
    #[must_use]
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(_) | Self::ProviderUnavailable(_) | Self::PermissionDenied(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{AppError, NonEmptyString};

    #[test]
    fn non_empty_string_rejects_whitespace() {
        let result = NonEmptyString::new("   ");
        assert!(matches!(result, Err(AppError::InvalidArgument(_))));
    }

    #[test]
    fn provider_failures_are_classified() {
        assert!(AppError::Provider("AccessDenied".to_owned()).is_provider_failure());
        assert!(AppError::ProviderUnavailable("timeout".to_owned()).is_provider_failure());
        assert!(!AppError::NotFound("csp account".to_owned()).is_provider_failure());
    }
}
