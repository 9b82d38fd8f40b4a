//! Router assembly.

pub mod common;
pub mod tenant;

pub use common::common_routes;
pub use tenant::tenant_routes;

use crate::state::AppState;
use axum::Router;
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

/// Requests carry no payload the service reads.
const MAX_BODY_BYTES: usize = 64 * 1024;

/// Full application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(common_routes(state.clone()))
        .merge(tenant_routes(state))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
}
