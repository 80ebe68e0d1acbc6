//! API Module
//!
//! HTTP surface of the gateway.
//!
//! # Requests
//! - `GET /{item}` or `GET /{table}/{item}` - Read an item
//! - `PATCH /{item}` or `PATCH /{table}/{item}` - Write an item (JSON body)

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
