//! Typed errors and HTTP mapping.

use crate::tenant::TenantId;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures of tenant context, registry and connection resolution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TenantError {
    #[error("no tenant bound to the current request")]
    NoTenantBound,
    #[error("unknown tenant: {0}")]
    UnknownTenant(TenantId),
    #[error("duplicate tenant: {0}")]
    DuplicateTenant(TenantId),
    #[error("tenant {tenant}: database {database} already belongs to tenant {owner}")]
    SharedDatabase {
        tenant: TenantId,
        owner: TenantId,
        database: String,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config load: {0}")]
    Load(String),
    #[error("config parse: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Tenant(#[from] TenantError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database: {0}")]
    Db(#[from] sqlx::Error),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("internal: {0}")]
    Internal(String),
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl AppError {
    /// HTTP status and stable error code for this error.
    pub fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::Tenant(TenantError::NoTenantBound) => (StatusCode::UNAUTHORIZED, "no_tenant_bound"),
            AppError::Tenant(TenantError::UnknownTenant(_)) => (StatusCode::FORBIDDEN, "unknown_tenant"),
            AppError::Tenant(TenantError::DuplicateTenant(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "duplicate_tenant")
            }
            AppError::Tenant(TenantError::SharedDatabase { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "shared_database")
            }
            AppError::Config(_) => (StatusCode::INTERNAL_SERVER_ERROR, "config_error"),
            AppError::Db(_) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code, "request failed");
        } else {
            tracing::warn!(error = %self, code, "request rejected");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tenant_errors_map_to_auth_statuses() {
        let no_tenant: AppError = TenantError::NoTenantBound.into();
        assert_eq!(no_tenant.status_and_code(), (StatusCode::UNAUTHORIZED, "no_tenant_bound"));

        let unknown: AppError = TenantError::UnknownTenant(TenantId::from("ghost-tenant")).into();
        assert_eq!(unknown.status_and_code(), (StatusCode::FORBIDDEN, "unknown_tenant"));
        assert_eq!(unknown.to_string(), "unknown tenant: ghost-tenant");
    }

    #[test]
    fn bad_request_maps_to_400() {
        let err = AppError::BadRequest("invalid limit".into());
        assert_eq!(err.status_and_code(), (StatusCode::BAD_REQUEST, "bad_request"));
    }

    #[test]
    fn config_errors_are_server_errors() {
        let err: AppError = ConfigError::Validation("no tenants".into()).into();
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
