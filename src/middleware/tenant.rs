//! Tenant resolution: the first step of every request.
//!
//! Binds the authenticated principal's name as the request's tenant before any
//! handler runs, then always forwards to the handler. The binding is cleared
//! when handling ends, whether the handler succeeds, fails, panics or is
//! cancelled. Anonymous requests proceed with no tenant bound; whether they may
//! touch data is up to the handler.

use super::Principal;
use crate::tenant::{TenantContext, TenantGuard, TenantId};
use axum::{extract::Request, middleware::Next, response::Response};
use std::future::Future;

/// Run `fut` in a fresh tenant scope bound to `principal`, if any.
pub async fn with_principal<F: Future>(principal: Option<&Principal>, fut: F) -> F::Output {
    let tenant = principal.map(|p| TenantId::from(p.name()));
    TenantContext::scope(async move {
        let _guard = TenantGuard::bind(tenant);
        fut.await
    })
    .await
}

/// Axum adapter for [`with_principal`]; use with `axum::middleware::from_fn`.
pub async fn resolve_tenant(req: Request, next: Next) -> Response {
    let principal = req.extensions().get::<Principal>().cloned();
    match &principal {
        Some(p) => tracing::debug!(tenant = %p.name(), "request bound to tenant"),
        None => tracing::debug!("anonymous request, no tenant bound"),
    }
    with_principal(principal.as_ref(), next.run(req)).await
}
