use async_trait::async_trait;
use cloudtrust_core::{AppResult, CallerIdentity};
use cloudtrust_domain::AuditAction;

/// Immutable audit event payload emitted by application services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Subject that performed the action.
    pub subject: String,
    /// Stable audit action identifier.
    pub action: AuditAction,
    /// Resource type label.
    pub resource_type: String,
    /// Resource identifier.
    pub resource_id: String,
    /// Optional audit detail payload. Never carries secret material.
    pub detail: Option<String>,
}

impl AuditEvent {
    /// Creates an event attributed to the given caller.
    #[must_use]
    pub fn new(
        actor: &CallerIdentity,
        action: AuditAction,
        resource_type: &str,
        resource_id: impl Into<String>,
        detail: Option<String>,
    ) -> Self {
        Self {
            subject: actor.subject().to_owned(),
            action,
            resource_type: resource_type.to_owned(),
            resource_id: resource_id.into(),
            detail,
        }
    }
}

/// Port for persisting append-only audit events.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Persists one audit event.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;
}
