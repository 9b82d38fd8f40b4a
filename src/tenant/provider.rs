//! Tenant-aware connection resolution for data access.

use super::{TenantContext, TenantRecord, TenantRegistry};
use crate::error::TenantError;
use std::sync::Arc;

/// Resolves the connection for the tenant bound to the current request.
///
/// Never falls back to a default tenant: an unbound request fails with
/// [`TenantError::NoTenantBound`] and an unregistered id with
/// [`TenantError::UnknownTenant`]. Connections are pre-established at startup,
/// so resolution is a map lookup and nothing is retried or reconnected here.
#[derive(Clone, Debug)]
pub struct TenantConnectionProvider {
    registry: Arc<TenantRegistry>,
}

impl TenantConnectionProvider {
    pub fn new(registry: Arc<TenantRegistry>) -> Self {
        TenantConnectionProvider { registry }
    }

    pub fn registry(&self) -> &TenantRegistry {
        &self.registry
    }

    /// Connection of the tenant bound by the current request's context.
    pub fn connection(&self) -> Result<&TenantRecord, TenantError> {
        let tenant = TenantContext::get().ok_or(TenantError::NoTenantBound)?;
        let record = self.registry.resolve(tenant.as_str())?;
        tracing::debug!(tenant = %tenant, database = %record.database_name(), "resolved tenant connection");
        Ok(record)
    }

    /// Connection of an explicitly named tenant, bypassing the ambient
    /// context but not the registry. Every call is logged with both ids.
    pub fn connection_for(&self, tenant_id: &str) -> Result<&TenantRecord, TenantError> {
        let ambient = TenantContext::get();
        match self.registry.resolve(tenant_id) {
            Ok(record) => {
                tracing::info!(
                    tenant = %tenant_id,
                    ambient_tenant = ambient.as_ref().map(|t| t.as_str()).unwrap_or("-"),
                    database = %record.database_name(),
                    "explicit tenant connection"
                );
                Ok(record)
            }
            Err(e) => {
                tracing::warn!(tenant = %tenant_id, error = %e, "explicit tenant connection refused");
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConnectionDefaults, TenantsConfig};
    use crate::tenant::TenantId;

    fn provider() -> TenantConnectionProvider {
        let registry = TenantRegistry::from_config(&TenantsConfig::builtin(), &ConnectionDefaults::default()).unwrap();
        TenantConnectionProvider::new(Arc::new(registry))
    }

    #[tokio::test]
    async fn no_tenant_bound_without_set() {
        let provider = provider();
        assert_eq!(provider.connection().unwrap_err(), TenantError::NoTenantBound);

        TenantContext::scope(async {
            assert_eq!(provider.connection().unwrap_err(), TenantError::NoTenantBound);
        })
        .await;
    }

    #[tokio::test]
    async fn ambient_tenant_selects_its_database() {
        let provider = provider();
        TenantContext::scope(async {
            TenantContext::set(TenantId::from("user"));
            let user = provider.connection().unwrap();
            assert_eq!(user.database_name(), "tenant_user");

            TenantContext::set(TenantId::from("admin"));
            let admin = provider.connection().unwrap();
            assert_eq!(admin.database_name(), "tenant_admin");
            assert_ne!(user.connection(), admin.connection());
        })
        .await;
    }

    #[tokio::test]
    async fn unknown_ambient_tenant_is_not_defaulted() {
        let provider = provider();
        TenantContext::scope(async {
            TenantContext::set(TenantId::from("ghost-tenant"));
            assert_eq!(
                provider.connection().unwrap_err(),
                TenantError::UnknownTenant(TenantId::from("ghost-tenant"))
            );
        })
        .await;
    }

    #[tokio::test]
    async fn explicit_tenant_goes_through_the_registry() {
        let provider = provider();
        TenantContext::scope(async {
            TenantContext::set(TenantId::from("user"));
            assert_eq!(provider.connection_for("admin").unwrap().database_name(), "tenant_admin");
            assert_eq!(
                provider.connection_for("ghost-tenant").unwrap_err(),
                TenantError::UnknownTenant(TenantId::from("ghost-tenant"))
            );
            // the ambient binding is untouched
            assert_eq!(provider.connection().unwrap().database_name(), "tenant_user");
        })
        .await;

        assert_eq!(provider.connection_for("user").unwrap().database_name(), "tenant_user");
    }
}
