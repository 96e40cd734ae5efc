use chrono::{DateTime, Utc};
use cloudtrust_domain::PolicyDocument;

/// Which provider policies a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyListScope {
    /// Every policy visible to the caller.
    All,
    /// Policies owned by the provider.
    Provider,
    /// Policies owned by the account.
    Local,
}

impl PolicyListScope {
    /// Parses a scope label, falling back to [`PolicyListScope::Local`] for unknown values.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Self::All,
            "aws" | "provider" | "csp" => Self::Provider,
            _ => Self::Local,
        }
    }

    /// Returns a stable label.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Provider => "Provider",
            Self::Local => "Local",
        }
    }
}

/// Filter and continuation for one page of provider policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyListFilter {
    /// Ownership scope.
    pub scope: PolicyListScope,
    /// Optional path prefix.
    pub path_prefix: Option<String>,
    /// Continuation marker from the previous page.
    pub marker: Option<String>,
    /// Page size hint.
    pub max_items: Option<i32>,
}

impl PolicyListFilter {
    /// Creates a first-page filter for a scope.
    #[must_use]
    pub fn first_page(scope: PolicyListScope) -> Self {
        Self {
            scope,
            path_prefix: None,
            marker: None,
            max_items: None,
        }
    }

    /// Returns a copy pointing at the next page.
    #[must_use]
    pub fn next_page(&self, marker: String) -> Self {
        Self {
            marker: Some(marker),
            ..self.clone()
        }
    }
}

/// Provider-side view of a managed policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderPolicy {
    /// Policy name.
    pub name: String,
    /// Provider identifier such as an IAM policy ARN.
    pub provider_policy_id: String,
    /// Path prefix.
    pub path: Option<String>,
    /// Description.
    pub description: Option<String>,
    /// Default version id.
    pub default_version_id: Option<String>,
    /// Number of principals the policy is attached to.
    pub attachment_count: Option<i32>,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for creating a managed policy at the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateProviderPolicyInput {
    /// Policy name.
    pub name: String,
    /// Optional path prefix.
    pub path: Option<String>,
    /// Optional description.
    pub description: Option<String>,
    /// Permission document.
    pub document: PolicyDocument,
}

/// One page of provider policies.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyPage {
    /// Policies on this page.
    pub policies: Vec<ProviderPolicy>,
    /// Marker for the next page, absent on the last page.
    pub next_marker: Option<String>,
}
