//! Access log: one `(tenant, timestamp)` entry per handled request, stored
//! with the tenant's own data.

use crate::error::AppError;
use crate::tenant::{TenantId, TenantRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;

pub const ACCESS_LOG_TABLE: &str = "access_logs";

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AccessLogEntry {
    pub tenant_id: TenantId,
    pub timestamp: DateTime<Utc>,
}

impl AccessLogEntry {
    pub fn now(tenant_id: TenantId) -> Self {
        AccessLogEntry {
            tenant_id,
            timestamp: Utc::now(),
        }
    }
}

/// Append-only sink for access log entries, addressed through the tenant's
/// resolved connection.
#[async_trait]
pub trait AccessLogStore: Send + Sync {
    /// Prepare the tenant's store before traffic starts.
    async fn prepare(&self, _tenant: &TenantRecord) -> Result<(), AppError> {
        Ok(())
    }

    async fn append(&self, tenant: &TenantRecord, entry: &AccessLogEntry) -> Result<(), AppError>;

    /// Most recent entries first.
    async fn recent(&self, tenant: &TenantRecord, limit: u32) -> Result<Vec<AccessLogEntry>, AppError>;
}

fn ensure_same_tenant(tenant: &TenantRecord, entry: &AccessLogEntry) -> Result<(), AppError> {
    if tenant.tenant_id() != &entry.tenant_id {
        return Err(AppError::Internal(format!(
            "access log entry for {} written through connection of {}",
            entry.tenant_id,
            tenant.tenant_id()
        )));
    }
    Ok(())
}

/// Writes to the `access_logs` table in the tenant's database.
#[derive(Clone, Debug, Default)]
pub struct PgAccessLog;

#[async_trait]
impl AccessLogStore for PgAccessLog {
    async fn prepare(&self, tenant: &TenantRecord) -> Result<(), AppError> {
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id UUID PRIMARY KEY,
                tenant_id TEXT NOT NULL,
                accessed_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            ACCESS_LOG_TABLE
        );
        sqlx::query(&ddl).execute(tenant.pool()).await?;
        tracing::info!(tenant = %tenant.tenant_id(), database = %tenant.database_name(), "access log ready");
        Ok(())
    }

    async fn append(&self, tenant: &TenantRecord, entry: &AccessLogEntry) -> Result<(), AppError> {
        ensure_same_tenant(tenant, entry)?;
        let sql = format!(
            "INSERT INTO {} (id, tenant_id, accessed_at) VALUES ($1, $2, $3)",
            ACCESS_LOG_TABLE
        );
        sqlx::query(&sql)
            .bind(uuid::Uuid::new_v4())
            .bind(entry.tenant_id.as_str())
            .bind(entry.timestamp)
            .execute(tenant.pool())
            .await?;
        Ok(())
    }

    async fn recent(&self, tenant: &TenantRecord, limit: u32) -> Result<Vec<AccessLogEntry>, AppError> {
        let sql = format!(
            "SELECT tenant_id, accessed_at FROM {} ORDER BY accessed_at DESC LIMIT $1",
            ACCESS_LOG_TABLE
        );
        let rows = sqlx::query_as::<_, (String, DateTime<Utc>)>(&sql)
            .bind(i64::from(limit))
            .fetch_all(tenant.pool())
            .await?;
        Ok(rows
            .into_iter()
            .map(|(tenant_id, timestamp)| AccessLogEntry {
                tenant_id: TenantId::from(tenant_id),
                timestamp,
            })
            .collect())
    }
}

/// Keeps entries in process memory, partitioned by tenant.
#[derive(Debug, Default)]
pub struct MemoryAccessLog {
    by_tenant: RwLock<HashMap<TenantId, Vec<AccessLogEntry>>>,
}

impl MemoryAccessLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries of `tenant_id`, oldest first.
    pub fn entries(&self, tenant_id: &str) -> Vec<AccessLogEntry> {
        self.by_tenant
            .read()
            .map(|m| m.get(tenant_id).cloned().unwrap_or_default())
            .unwrap_or_default()
    }
}

fn poisoned<T>(_: T) -> AppError {
    AppError::Internal("access log lock poisoned".into())
}

#[async_trait]
impl AccessLogStore for MemoryAccessLog {
    async fn append(&self, tenant: &TenantRecord, entry: &AccessLogEntry) -> Result<(), AppError> {
        ensure_same_tenant(tenant, entry)?;
        self.by_tenant
            .write()
            .map_err(poisoned)?
            .entry(tenant.tenant_id().clone())
            .or_default()
            .push(entry.clone());
        Ok(())
    }

    async fn recent(&self, tenant: &TenantRecord, limit: u32) -> Result<Vec<AccessLogEntry>, AppError> {
        let guard = self.by_tenant.read().map_err(poisoned)?;
        Ok(guard
            .get(tenant.tenant_id())
            .map(|entries| entries.iter().rev().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }
}
