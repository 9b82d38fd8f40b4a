//! Common routes: health, readiness, version.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::time::Duration;
use tokio::task::JoinSet;

/// Upper bound for a single tenant ping during a readiness check.
pub const READY_PING_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

/// Aggregate counts only; which tenants failed is logged, never returned.
#[derive(Serialize)]
struct ReadyBody {
    status: &'static str,
    tenants: usize,
    unavailable: usize,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

/// Ping every tenant database concurrently; degraded if any is unreachable.
async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyBody>) {
    let mut pings = JoinSet::new();
    for record in state.registry().iter() {
        let tenant = record.tenant_id().clone();
        let pool = record.pool().clone();
        pings.spawn(async move {
            let ok = matches!(
                tokio::time::timeout(READY_PING_TIMEOUT, sqlx::query("SELECT 1").fetch_optional(&pool)).await,
                Ok(Ok(_))
            );
            (tenant, ok)
        });
    }

    let tenants = state.registry().len();
    let mut unavailable = 0;
    while let Some(joined) = pings.join_next().await {
        match joined {
            Ok((_, true)) => {}
            Ok((tenant, false)) => {
                tracing::warn!(tenant = %tenant, "tenant database unavailable");
                unavailable += 1;
            }
            Err(e) => {
                tracing::error!("readiness ping task failed: {}", e);
                unavailable += 1;
            }
        }
    }

    let (status, label) = if unavailable == 0 {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };
    (
        status,
        Json(ReadyBody {
            status: label,
            tenants,
            unavailable,
        }),
    )
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready, GET /version, GET /info.
pub fn common_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/info", get(version))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access_log::MemoryAccessLog;
    use crate::tenant::registry::lazy_pool;
    use crate::tenant::TenantRegistry;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use std::sync::Arc;
    use std::time::Instant;
    use tower::ServiceExt;

    #[tokio::test]
    async fn ready_reports_counts_without_tenant_names() {
        let mut builder = TenantRegistry::builder();
        for (tenant, db) in [("acme-secret", "acme_db"), ("globex-secret", "globex_db"), ("initech-secret", "initech_db")] {
            builder
                .register(tenant, db, |name| lazy_pool("postgres://127.0.0.1:1", name, 1))
                .unwrap();
        }
        let state = AppState::new(Arc::new(builder.build()), Arc::new(MemoryAccessLog::new()));

        let started = Instant::now();
        let response = common_routes(state)
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(started.elapsed() < READY_PING_TIMEOUT * 2);
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(!text.contains("secret"));
        assert!(!text.contains("_db"));
        let body: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["tenants"], 3);
        assert_eq!(body["unavailable"], 3);
    }
}
