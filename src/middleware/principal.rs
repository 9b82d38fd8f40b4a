//! Authenticated principal as handed over by the authentication layer.
//!
//! Credential checks happen upstream (a proxy or gateway). That layer puts
//! the verified user name in `X-Authenticated-User`, and this middleware only
//! lifts it into request extensions for [`super::resolve_tenant`].

use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

/// Header carrying the authenticated user name.
pub const AUTHENTICATED_USER_HEADER: &str = "X-Authenticated-User";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    name: String,
}

impl Principal {
    pub fn new(name: impl Into<String>) -> Self {
        Principal { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Principal named by the authentication header. Missing, blank or
/// non-UTF-8 values mean the request is anonymous.
pub fn extract_principal(headers: &HeaderMap) -> Option<Principal> {
    headers
        .get(AUTHENTICATED_USER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Principal::new)
}

/// Use with `axum::middleware::from_fn`, outside of `resolve_tenant`.
pub async fn principal_from_header(mut req: Request, next: Next) -> Response {
    if let Some(principal) = extract_principal(req.headers()) {
        req.extensions_mut().insert(principal);
    }
    next.run(req).await
}
