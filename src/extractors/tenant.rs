//! Extract the tenant bound to the current request.

use crate::tenant::{TenantContext, TenantId};
use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};

/// Tenant bound by `resolve_tenant`, `None` for anonymous requests.
#[derive(Clone, Debug)]
pub struct CurrentTenant(pub Option<TenantId>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentTenant
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentTenant(TenantContext::get()))
    }
}
