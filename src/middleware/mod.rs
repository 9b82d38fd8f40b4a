//! Request middleware: upstream principal capture and tenant resolution.

pub mod access;
pub mod principal;
pub mod tenant;

pub use access::record_access;
pub use principal::{extract_principal, principal_from_header, Principal, AUTHENTICATED_USER_HEADER};
pub use tenant::{resolve_tenant, with_principal};
