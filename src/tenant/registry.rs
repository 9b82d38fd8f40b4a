//! Tenant registry: tenant id to that tenant's dedicated database connection.
//!
//! Built once at startup through [`TenantRegistryBuilder`], then shared
//! read-only (behind `Arc`) by every request. There is no way to add or
//! replace a tenant on a built registry.

use super::TenantId;
use crate::config::{ConnectionDefaults, TenantsConfig};
use crate::error::{AppError, ConfigError, TenantError};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use uuid::Uuid;

/// Bound on waiting for a tenant connection, so an unreachable tenant
/// database fails requests instead of stalling them.
pub const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Established channel to one tenant's database. Each registered tenant gets
/// its own handle; handles compare equal only to themselves.
#[derive(Clone, Debug)]
pub struct ConnectionHandle {
    id: Uuid,
    pool: PgPool,
}

impl ConnectionHandle {
    fn new(pool: PgPool) -> Self {
        ConnectionHandle {
            id: Uuid::new_v4(),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

/// A provisioned tenant. Immutable once registered.
#[derive(Clone, Debug)]
pub struct TenantRecord {
    tenant_id: TenantId,
    database_name: String,
    connection: ConnectionHandle,
}

impl TenantRecord {
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    pub fn connection(&self) -> &ConnectionHandle {
        &self.connection
    }

    pub fn pool(&self) -> &PgPool {
        &self.connection.pool
    }
}

#[derive(Clone, Debug, Default)]
pub struct TenantRegistry {
    by_id: HashMap<TenantId, TenantRecord>,
}

impl TenantRegistry {
    pub fn builder() -> TenantRegistryBuilder {
        TenantRegistryBuilder::default()
    }

    /// One lazily connecting pool per configured tenant.
    /// Must be called from within a tokio runtime.
    pub fn from_config(config: &TenantsConfig, defaults: &ConnectionDefaults) -> Result<Self, AppError> {
        let mut builder = TenantRegistry::builder();
        for def in &config.tenants {
            let url = def.database_url.as_deref().unwrap_or(&defaults.database_url);
            let max_connections = def.max_connections.unwrap_or(defaults.max_connections);
            let opts = server_options(url, &def.database_name)?;
            let server = format!("{}:{}", opts.get_host(), opts.get_port());
            builder.register_on(&server, def.tenant_id.as_str(), def.database_name.as_str(), |database_name| {
                Ok(pool_with(opts.database(database_name), max_connections))
            })?;
        }
        Ok(builder.build())
    }

    pub fn resolve(&self, tenant_id: &str) -> Result<&TenantRecord, TenantError> {
        self.by_id
            .get(tenant_id)
            .ok_or_else(|| TenantError::UnknownTenant(TenantId::from(tenant_id)))
    }

    /// Registered tenant ids in sorted order.
    pub fn tenant_ids(&self) -> Vec<&TenantId> {
        let mut ids: Vec<&TenantId> = self.by_id.keys().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &TenantRecord> {
        self.by_id.values()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Close every tenant connection. Called once at shutdown.
    pub async fn close_all(&self) {
        for record in self.by_id.values() {
            record.connection.pool.close().await;
            tracing::debug!(tenant = %record.tenant_id, "tenant connection closed");
        }
    }
}

/// Startup-only registration phase of a [`TenantRegistry`].
#[derive(Default)]
pub struct TenantRegistryBuilder {
    by_id: HashMap<TenantId, TenantRecord>,
    /// (server, database name) already claimed, and by which tenant.
    stores: HashMap<(String, String), TenantId>,
}

impl TenantRegistryBuilder {
    /// Add a tenant whose databases all live on one server. See
    /// [`TenantRegistryBuilder::register_on`].
    pub fn register<F>(
        &mut self,
        tenant_id: impl Into<TenantId>,
        database_name: impl Into<String>,
        factory: F,
    ) -> Result<&mut Self, AppError>
    where
        F: FnOnce(&str) -> Result<PgPool, AppError>,
    {
        self.register_on("", tenant_id, database_name, factory)
    }

    /// Add a tenant whose database lives on `server`. `factory` receives the
    /// database name and opens that tenant's connection. It is not called
    /// when the id is already registered or when another tenant already owns
    /// the same database on the same server.
    pub fn register_on<F>(
        &mut self,
        server: &str,
        tenant_id: impl Into<TenantId>,
        database_name: impl Into<String>,
        factory: F,
    ) -> Result<&mut Self, AppError>
    where
        F: FnOnce(&str) -> Result<PgPool, AppError>,
    {
        let tenant_id = tenant_id.into();
        if self.by_id.contains_key(&tenant_id) {
            return Err(TenantError::DuplicateTenant(tenant_id).into());
        }
        let database_name = database_name.into();
        let store = (server.to_string(), database_name.clone());
        if let Some(owner) = self.stores.get(&store) {
            return Err(TenantError::SharedDatabase {
                tenant: tenant_id,
                owner: owner.clone(),
                database: database_name,
            }
            .into());
        }
        let pool = factory(&database_name)?;
        tracing::info!(tenant = %tenant_id, database = %database_name, "tenant registered");
        self.stores.insert(store, tenant_id.clone());
        self.by_id.insert(
            tenant_id.clone(),
            TenantRecord {
                tenant_id,
                database_name,
                connection: ConnectionHandle::new(pool),
            },
        );
        Ok(self)
    }

    pub fn build(self) -> TenantRegistry {
        TenantRegistry { by_id: self.by_id }
    }
}

/// Pool for `database_name` on the server at `database_url`. No connection
/// is opened until first use.
pub fn lazy_pool(database_url: &str, database_name: &str, max_connections: u32) -> Result<PgPool, AppError> {
    let opts = server_options(database_url, database_name)?.database(database_name);
    Ok(pool_with(opts, max_connections))
}

fn server_options(database_url: &str, database_name: &str) -> Result<PgConnectOptions, ConfigError> {
    PgConnectOptions::from_str(database_url)
        .map_err(|e| ConfigError::Validation(format!("invalid database url for {}: {}", database_name, e)))
}

fn pool_with(opts: PgConnectOptions, max_connections: u32) -> PgPool {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_lazy_with(opts)
}
