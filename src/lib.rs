//! Tenant router: per-request tenant resolution and tenant-isolated database
//! routing for an axum service.
//!
//! A request's authenticated principal names its tenant. [`middleware::resolve_tenant`]
//! binds that tenant in a request-scoped [`tenant::TenantContext`] before any
//! handler runs and clears it when the request ends; handlers obtain the
//! tenant's own database connection from [`tenant::TenantConnectionProvider`],
//! which looks it up in the startup-built [`tenant::TenantRegistry`].

pub mod access_log;
pub mod config;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod state;
pub mod tenant;

pub use access_log::{AccessLogEntry, AccessLogStore, MemoryAccessLog, PgAccessLog};
pub use config::{load_tenants, ServerConfig, TenantsConfig};
pub use error::{AppError, ConfigError, TenantError};
pub use middleware::{principal_from_header, resolve_tenant, with_principal, Principal};
pub use routes::{app, common_routes, tenant_routes};
pub use state::AppState;
pub use tenant::{TenantConnectionProvider, TenantContext, TenantId, TenantRecord, TenantRegistry};
