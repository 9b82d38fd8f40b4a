//! Tenant identity, request-scoped tenant context, the tenant registry and
//! tenant-aware connection resolution.

pub mod context;
pub mod id;
pub mod provider;
pub mod registry;

pub use context::{TenantContext, TenantGuard};
pub use id::TenantId;
pub use provider::TenantConnectionProvider;
pub use registry::{ConnectionHandle, TenantRecord, TenantRegistry, TenantRegistryBuilder};
