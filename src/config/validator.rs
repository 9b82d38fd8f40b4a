//! Tenant definition validation.

use crate::config::TenantsConfig;
use crate::error::ConfigError;

/// PostgreSQL truncates identifiers beyond this length.
const MAX_IDENTIFIER_LEN: usize = 63;

pub fn validate(config: &TenantsConfig) -> Result<(), ConfigError> {
    if config.tenants.is_empty() {
        return Err(ConfigError::Validation("at least one tenant required".into()));
    }
    for t in &config.tenants {
        if t.tenant_id.trim().is_empty() {
            return Err(ConfigError::Validation("tenant_id must not be empty".into()));
        }
        if t.tenant_id != t.tenant_id.trim() {
            return Err(ConfigError::Validation(format!(
                "tenant_id '{}' has surrounding whitespace",
                t.tenant_id
            )));
        }
        validate_database_name(&t.database_name)
            .map_err(|msg| ConfigError::Validation(format!("tenant {}: {}", t.tenant_id, msg)))?;
        if t.max_connections == Some(0) {
            return Err(ConfigError::Validation(format!(
                "tenant {}: max_connections must be positive",
                t.tenant_id
            )));
        }
    }
    Ok(())
}

fn validate_database_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("database_name must not be empty".into());
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(format!("database_name '{}' longer than {} bytes", name, MAX_IDENTIFIER_LEN));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
        return Err(format!("database_name '{}' has invalid characters", name));
    }
    Ok(())
}
