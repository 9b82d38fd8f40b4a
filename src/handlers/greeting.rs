//! Tenant-scoped handlers. Every data access goes through the connection of
//! the tenant bound to the request. Access entries are written by
//! `record_access` before these run.

use crate::error::AppError;
use crate::extractors::CurrentTenant;
use crate::response::{success_many, success_one_ok};
use crate::state::AppState;
use crate::tenant::TenantId;
use axum::extract::{rejection::QueryRejection, Query, State};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_LIMIT: u32 = 20;
pub const MAX_LOG_LIMIT: u32 = 100;

#[derive(Serialize)]
pub struct Greeting {
    pub message: String,
    pub tenant: TenantId,
    pub database: String,
}

#[derive(Serialize)]
pub struct Identity {
    pub tenant: Option<TenantId>,
    pub database: Option<String>,
}

#[derive(Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u32>,
}

/// GET / — greet the caller with their tenant and database.
pub async fn index(State(state): State<AppState>) -> Result<impl axum::response::IntoResponse, AppError> {
    let record = state.provider.connection()?;
    Ok(success_one_ok(Greeting {
        message: format!("hello,{}", record.tenant_id()),
        tenant: record.tenant_id().clone(),
        database: record.database_name().to_string(),
    }))
}

/// GET /whoami — tenant bound to this request; both fields null when anonymous.
pub async fn whoami(
    State(state): State<AppState>,
    CurrentTenant(tenant): CurrentTenant,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let database = match tenant {
        Some(_) => Some(state.provider.connection()?.database_name().to_string()),
        None => None,
    };
    Ok(success_one_ok(Identity { tenant, database }))
}

/// GET /logs?limit=N — most recent access log entries of the caller's tenant.
pub async fn access_logs(
    State(state): State<AppState>,
    query: Result<Query<LogsQuery>, QueryRejection>,
) -> Result<impl axum::response::IntoResponse, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let limit = query.limit.unwrap_or(DEFAULT_LOG_LIMIT).clamp(1, MAX_LOG_LIMIT);
    let record = state.provider.connection()?;
    let entries = state.access_log.recent(record, limit).await?;
    Ok(success_many(entries))
}
