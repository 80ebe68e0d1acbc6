//! Coordinator Module
//!
//! Ties address resolution, the item cache and the store gateway together for
//! each request.

mod locks;
mod request;

pub use locks::{KeyGuard, KeyLocks};
pub use request::{CoordinatorOptions, RequestCoordinator};
