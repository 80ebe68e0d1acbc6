//! Table Cache - a cache-aside HTTP gateway over a table-partitioned store
//!
//! Items are addressed by request path, read through a TTL cache, and
//! written to the persistent store before the cache is refreshed.

pub mod address;
pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod storage;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use coordinator::RequestCoordinator;
pub use error::GatewayError;
pub use tasks::spawn_cleanup_task;
