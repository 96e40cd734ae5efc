use std::str::FromStr;

use cloudtrust_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::account::trim_optional;
use crate::{CspAccountId, CspPolicyId};

/// Provider policy document kept as an open JSON object.
pub type PolicyDocument = Map<String, Value>;

/// Policy kinds tracked by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyType {
    /// Embedded in exactly one role.
    Inline,
    /// Standalone provider-managed or customer-managed policy.
    Managed,
    /// Locally authored policy not yet pushed to the provider.
    Custom,
}

impl PolicyType {
    /// Returns a stable storage value for this policy type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inline => "inline",
            Self::Managed => "managed",
            Self::Custom => "custom",
        }
    }
}

impl FromStr for PolicyType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Self::Inline),
            "managed" => Ok(Self::Managed),
            "custom" => Ok(Self::Custom),
            _ => Err(AppError::InvalidArgument(format!(
                "unknown policy type value '{value}'"
            ))),
        }
    }
}

/// Permission document owned by a CSP account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CspPolicy {
    id: CspPolicyId,
    name: NonEmptyString,
    csp_account_id: CspAccountId,
    policy_type: PolicyType,
    provider_policy_id: Option<String>,
    document: PolicyDocument,
    description: Option<String>,
}

/// Input payload used to construct a validated CSP policy.
#[derive(Debug, Clone, PartialEq)]
pub struct CspPolicyInput {
    /// Stable policy identifier.
    pub id: CspPolicyId,
    /// Name, unique per account.
    pub name: String,
    /// Owning account.
    pub csp_account_id: CspAccountId,
    /// Policy kind.
    pub policy_type: PolicyType,
    /// Provider-side identifier such as an IAM policy ARN.
    pub provider_policy_id: Option<String>,
    /// Permission statements, stored as given.
    pub document: PolicyDocument,
    /// Optional description.
    pub description: Option<String>,
}

impl CspPolicy {
    /// Creates a validated CSP policy.
    pub fn new(input: CspPolicyInput) -> AppResult<Self> {
        let CspPolicyInput {
            id,
            name,
            csp_account_id,
            policy_type,
            provider_policy_id,
            document,
            description,
        } = input;

        Ok(Self {
            id,
            name: NonEmptyString::new(name.trim())?,
            csp_account_id,
            policy_type,
            provider_policy_id: trim_optional(provider_policy_id),
            document,
            description: trim_optional(description),
        })
    }

    /// Returns the policy identifier.
    #[must_use]
    pub fn id(&self) -> CspPolicyId {
        self.id
    }

    /// Returns the policy name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the owning account.
    #[must_use]
    pub fn csp_account_id(&self) -> CspAccountId {
        self.csp_account_id
    }

    /// Returns the policy kind.
    #[must_use]
    pub fn policy_type(&self) -> PolicyType {
        self.policy_type
    }

    /// Returns the provider-side identifier.
    #[must_use]
    pub fn provider_policy_id(&self) -> Option<&str> {
        self.provider_policy_id.as_deref()
    }

    /// Returns the permission document.
    #[must_use]
    pub fn document(&self) -> &PolicyDocument {
        &self.document
    }

    /// Returns the optional description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns true when a non-empty document is stored locally.
    #[must_use]
    pub fn has_local_document(&self) -> bool {
        !self.document.is_empty()
    }
}
