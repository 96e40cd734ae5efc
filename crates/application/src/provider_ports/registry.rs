use std::collections::HashMap;
use std::sync::Arc;

use cloudtrust_core::{AppError, AppResult};
use cloudtrust_domain::CspType;

use super::adapter::CloudProviderAdapter;

/// Provider adapters keyed by the CSP type they serve.
#[derive(Clone, Default)]
pub struct ProviderAdapterRegistry {
    adapters: HashMap<CspType, Arc<dyn CloudProviderAdapter>>,
}

impl ProviderAdapterRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter under its own CSP type, replacing any previous one.
    #[must_use]
    pub fn with_adapter(mut self, adapter: Arc<dyn CloudProviderAdapter>) -> Self {
        self.adapters.insert(adapter.csp_type(), adapter);
        self
    }

    /// Returns the adapter for a CSP type.
    pub fn adapter(&self, csp_type: CspType) -> AppResult<Arc<dyn CloudProviderAdapter>> {
        self.adapters.get(&csp_type).cloned().ok_or_else(|| {
            AppError::Unimplemented(format!("no provider adapter registered for '{csp_type}'"))
        })
    }

    /// Returns the registered CSP types.
    #[must_use]
    pub fn csp_types(&self) -> Vec<CspType> {
        let mut csp_types = self.adapters.keys().copied().collect::<Vec<_>>();
        csp_types.sort();
        csp_types
    }
}
