//! Startup configuration: server settings and the static tenant definitions.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost:5432";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// One pre-provisioned tenant: its id and the database holding its data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantDefinition {
    pub tenant_id: String,
    pub database_name: String,
    /// Server URL for this tenant's database. Falls back to `DATABASE_URL`.
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default)]
    pub max_connections: Option<u32>,
}

impl TenantDefinition {
    pub fn new(tenant_id: impl Into<String>, database_name: impl Into<String>) -> Self {
        TenantDefinition {
            tenant_id: tenant_id.into(),
            database_name: database_name.into(),
            database_url: None,
            max_connections: None,
        }
    }
}

/// Contents of the tenants file: `{"tenants": [...]}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantsConfig {
    pub tenants: Vec<TenantDefinition>,
}

impl TenantsConfig {
    /// The two tenants served when no tenants file is configured.
    pub fn builtin() -> Self {
        TenantsConfig {
            tenants: vec![
                TenantDefinition::new("user", "tenant_user"),
                TenantDefinition::new("admin", "tenant_admin"),
            ],
        }
    }
}

/// Values a tenant definition inherits when it leaves them unset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionDefaults {
    pub database_url: String,
    pub max_connections: u32,
}

impl Default for ConnectionDefaults {
    fn default() -> Self {
        ConnectionDefaults {
            database_url: DEFAULT_DATABASE_URL.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// Where access log entries are written.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AccessLogBackend {
    /// `access_logs` table inside each tenant's database.
    Postgres,
    /// Process memory; lost on restart.
    Memory,
}

impl std::str::FromStr for AccessLogBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" => Ok(AccessLogBackend::Postgres),
            "memory" => Ok(AccessLogBackend::Memory),
            other => Err(ConfigError::Validation(format!(
                "invalid ACCESS_LOG: {} (expected postgres or memory)",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub connection: ConnectionDefaults,
    /// JSON tenants file. When unset the built-in tenants are used.
    pub tenants_path: Option<PathBuf>,
    pub access_log: AccessLogBackend,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: DEFAULT_BIND_ADDR.into(),
            connection: ConnectionDefaults::default(),
            tenants_path: None,
            access_log: AccessLogBackend::Postgres,
        }
    }
}
