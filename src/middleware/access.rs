//! Access logging at the request boundary: one `(tenant, timestamp)` entry
//! for every request bound to a registered tenant, before its handler runs.
//!
//! Requests without a tenant, or with an unregistered one, are not logged
//! here. Their handlers reject them.

use crate::access_log::AccessLogEntry;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Use with `axum::middleware::from_fn_with_state`, inside of `resolve_tenant`.
pub async fn record_access(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Ok(record) = state.provider.connection() {
        let entry = AccessLogEntry::now(record.tenant_id().clone());
        if let Err(e) = state.access_log.append(record, &entry).await {
            return e.into_response();
        }
    }
    next.run(req).await
}
