//! Load server settings from the environment and tenant definitions from JSON.

use crate::config::types::*;
use crate::config::validate;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

impl ServerConfig {
    /// Read settings from process environment (after `.env`, if the caller loaded one).
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset or blank values take defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let max_connections = match get("MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Validation(format!("invalid MAX_CONNECTIONS: {}", v)))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let access_log = match get("ACCESS_LOG") {
            Some(v) => v.parse()?,
            None => AccessLogBackend::Postgres,
        };

        Ok(ServerConfig {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into()),
            connection: ConnectionDefaults {
                database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.into()),
                max_connections,
            },
            tenants_path: get("TENANTS_PATH").map(PathBuf::from),
            access_log,
        })
    }
}

/// Parse and validate a tenants document.
pub fn parse_tenants(json: &str) -> Result<TenantsConfig, ConfigError> {
    let config: TenantsConfig = serde_json::from_str(json)?;
    validate(&config)?;
    Ok(config)
}

/// Read and validate the tenants file at `path`.
pub async fn load_tenants_from_path(path: &Path) -> Result<TenantsConfig, ConfigError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::Load(format!("{}: {}", path.display(), e)))?;
    parse_tenants(&raw)
}

/// Tenants for this server: the configured file, or the built-in pair.
pub async fn load_tenants(server: &ServerConfig) -> Result<TenantsConfig, ConfigError> {
    match &server.tenants_path {
        Some(path) => {
            tracing::info!("loading tenants from {}", path.display());
            load_tenants_from_path(path).await
        }
        None => {
            tracing::info!("TENANTS_PATH not set, using built-in tenants");
            let config = TenantsConfig::builtin();
            validate(&config)?;
            Ok(config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DATABASE_URL", "postgres://db:5432"),
            ("MAX_CONNECTIONS", "12"),
            ("TENANTS_PATH", "/etc/tenants.json"),
            ("ACCESS_LOG", "Memory"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.connection.database_url, "postgres://db:5432");
        assert_eq!(config.connection.max_connections, 12);
        assert_eq!(config.tenants_path, Some(PathBuf::from("/etc/tenants.json")));
        assert_eq!(config.access_log, AccessLogBackend::Memory);
    }

    #[test]
    fn rejects_bad_numbers_and_backends() {
        assert!(ServerConfig::from_lookup(lookup(&[("MAX_CONNECTIONS", "many")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("MAX_CONNECTIONS", "0")])).is_err());
        assert!(ServerConfig::from_lookup(lookup(&[("ACCESS_LOG", "syslog")])).is_err());
    }

    #[test]
    fn parses_tenants_document() {
        let config = parse_tenants(
            r#"{"tenants": [
                {"tenant_id": "user", "database_name": "tenant_user"},
                {"tenant_id": "admin", "database_name": "tenant_admin",
                 "database_url": "postgres://admin-db:5432", "max_connections": 2}
            ]}"#,
        )
        .unwrap();
        assert_eq!(config.tenants.len(), 2);
        assert_eq!(config.tenants[0], TenantDefinition::new("user", "tenant_user"));
        assert_eq!(config.tenants[1].database_url.as_deref(), Some("postgres://admin-db:5432"));
        assert_eq!(config.tenants[1].max_connections, Some(2));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(matches!(parse_tenants("{\"tenants\": 3}"), Err(ConfigError::Parse(_))));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = load_tenants_from_path(Path::new("/nonexistent/tenants.json")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[tokio::test]
    async fn builtin_tenants_without_path() {
        let config = load_tenants(&ServerConfig::default()).await.unwrap();
        assert_eq!(config, TenantsConfig::builtin());
    }
}
