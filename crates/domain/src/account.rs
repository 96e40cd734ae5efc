use std::collections::BTreeMap;

use cloudtrust_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

use crate::{CspAccountId, CspType};

/// Region used when an account does not declare one.
pub const DEFAULT_REGION: &str = "ap-northeast-2";

/// Free-form provider descriptors keyed by descriptor name.
pub type AccountDescriptors = BTreeMap<String, String>;

/// One cloud account, subscription or project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CspAccount {
    id: CspAccountId,
    name: NonEmptyString,
    csp_type: CspType,
    descriptors: AccountDescriptors,
    description: Option<String>,
    is_active: bool,
}

/// Input payload used to construct a validated CSP account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspAccountInput {
    /// Stable account identifier.
    pub id: CspAccountId,
    /// Display name, unique per CSP type.
    pub name: String,
    /// Owning provider.
    pub csp_type: CspType,
    /// Provider-specific descriptors such as `account_id` or `project_id`.
    pub descriptors: AccountDescriptors,
    /// Optional description.
    pub description: Option<String>,
    /// Active flag.
    pub is_active: bool,
}

impl CspAccount {
    /// Creates a validated CSP account.
    pub fn new(input: CspAccountInput) -> AppResult<Self> {
        let CspAccountInput {
            id,
            name,
            csp_type,
            descriptors,
            description,
            is_active,
        } = input;

        let descriptors = normalize_descriptors(descriptors)?;

        Ok(Self {
            id,
            name: NonEmptyString::new(name.trim())?,
            csp_type,
            descriptors,
            description: trim_optional(description),
            is_active,
        })
    }

    /// Returns the account identifier.
    #[must_use]
    pub fn id(&self) -> CspAccountId {
        self.id
    }

    /// Returns the account display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning provider.
    #[must_use]
    pub fn csp_type(&self) -> CspType {
        self.csp_type
    }

    /// Returns all descriptors.
    #[must_use]
    pub fn descriptors(&self) -> &AccountDescriptors {
        &self.descriptors
    }

    /// Returns one descriptor value.
    #[must_use]
    pub fn descriptor(&self, key: &str) -> Option<&str> {
        self.descriptors.get(key).map(String::as_str)
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns whether the account may be used for issuance and sync.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns the declared region, falling back to [`DEFAULT_REGION`].
    #[must_use]
    pub fn region(&self) -> &str {
        self.descriptor("region").unwrap_or(DEFAULT_REGION)
    }

    /// Returns a copy with a new active flag.
    #[must_use]
    pub fn with_active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// Checks that the descriptors required by the provider are present.
    pub fn validate_descriptors(&self) -> AppResult<()> {
        let required: &[&str] = match self.csp_type {
            CspType::Aws => &["account_id"],
            CspType::Gcp => &["project_id"],
            CspType::Azure => &["subscription_id", "tenant_id"],
        };

        let missing = required
            .iter()
            .filter(|key| self.descriptor(key).is_none())
            .copied()
            .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(AppError::InvalidArgument(format!(
                "{} account '{}' is missing descriptors: {}",
                self.csp_type,
                self.id,
                missing.join(", ")
            )));
        }

        Ok(())
    }
}

fn normalize_descriptors(descriptors: AccountDescriptors) -> AppResult<AccountDescriptors> {
    let mut normalized = AccountDescriptors::new();
    for (key, value) in descriptors {
        let key = key.trim();
        if key.is_empty() {
            return Err(AppError::InvalidArgument(
                "account descriptor keys must not be empty".to_owned(),
            ));
        }

        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        normalized.insert(key.to_owned(), value.to_owned());
    }

    Ok(normalized)
}

pub(crate) fn trim_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
