//! Tenant-scoped routes. Principal capture runs first, then tenant
//! resolution, then access logging, then the handler.

use crate::handlers::greeting::{access_logs, index, whoami};
use crate::middleware::{principal_from_header, record_access, resolve_tenant};
use crate::state::AppState;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};

pub fn tenant_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/whoami", get(whoami))
        .route("/logs", get(access_logs))
        .layer(from_fn_with_state(state.clone(), record_access))
        .with_state(state)
        .layer(from_fn(resolve_tenant))
        .layer(from_fn(principal_from_header))
}
