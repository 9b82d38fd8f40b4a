//! Shared application state for all routes. Immutable after startup.

use crate::access_log::AccessLogStore;
use crate::tenant::{TenantConnectionProvider, TenantRegistry};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub provider: TenantConnectionProvider,
    pub access_log: Arc<dyn AccessLogStore>,
}

impl AppState {
    pub fn new(registry: Arc<TenantRegistry>, access_log: Arc<dyn AccessLogStore>) -> Self {
        AppState {
            provider: TenantConnectionProvider::new(registry),
            access_log,
        }
    }

    pub fn registry(&self) -> &TenantRegistry {
        self.provider.registry()
    }
}
