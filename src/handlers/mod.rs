//! HTTP handlers for tenant-scoped requests.

pub mod greeting;
pub use greeting::*;
