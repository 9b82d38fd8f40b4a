//! Request-scoped tenant context.
//!
//! Each request runs inside its own [`TenantContext::scope`], which gives the
//! executing tokio task a private slot holding at most one [`TenantId`]. The
//! slot is dropped with the scope, and [`TenantGuard`] clears it when the
//! request's handling ends, so a worker task that is reused for the next
//! request never starts with the previous tenant.
//!
//! Tasks spawned from inside a scope do not inherit the slot.

use super::TenantId;
use std::cell::RefCell;
use std::future::Future;

tokio::task_local! {
    static CURRENT_TENANT: RefCell<Option<TenantId>>;
}

/// Accessor for the current request's tenant slot.
pub struct TenantContext;

impl TenantContext {
    /// Run `fut` with a fresh, unset tenant slot.
    pub async fn scope<F: Future>(fut: F) -> F::Output {
        CURRENT_TENANT.scope(RefCell::new(None), fut).await
    }

    /// Blocking counterpart of [`TenantContext::scope`].
    pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
        CURRENT_TENANT.sync_scope(RefCell::new(None), f)
    }

    /// Whether the caller runs inside a tenant scope.
    pub fn is_scoped() -> bool {
        CURRENT_TENANT.try_with(|_| ()).is_ok()
    }

    /// Bind `tenant` to the current request, replacing any earlier binding.
    /// Outside a scope there is no slot to write to and the call is ignored.
    pub fn set(tenant: TenantId) {
        let mut pending = Some(tenant);
        let bound = CURRENT_TENANT
            .try_with(|slot| {
                if let Ok(mut current) = slot.try_borrow_mut() {
                    *current = pending.take();
                }
            })
            .is_ok();
        if let Some(tenant) = pending {
            tracing::warn!(tenant = %tenant, scoped = bound, "tenant not bound to request");
        }
    }

    /// The tenant bound to the current request, or `None` if never set.
    pub fn get() -> Option<TenantId> {
        CURRENT_TENANT
            .try_with(|slot| slot.try_borrow().ok().and_then(|t| t.clone()))
            .ok()
            .flatten()
    }

    /// Remove the binding. No-op if nothing is bound or no scope exists.
    pub fn clear() {
        let _ = CURRENT_TENANT.try_with(|slot| {
            if let Ok(mut current) = slot.try_borrow_mut() {
                current.take();
            }
        });
    }
}

/// Binds a tenant for the lifetime of the guard and clears the slot on drop,
/// including when the owning future is cancelled or unwinds.
#[must_use = "the tenant is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct TenantGuard {
    _priv: (),
}

impl TenantGuard {
    pub fn bind(tenant: Option<TenantId>) -> Self {
        if let Some(tenant) = tenant {
            TenantContext::set(tenant);
        }
        TenantGuard { _priv: () }
    }
}

impl Drop for TenantGuard {
    fn drop(&mut self) {
        TenantContext::clear();
    }
}
