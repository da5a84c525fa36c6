//! API Module
//!
//! HTTP surface of the cache-aside gateway.
//!
//! # Endpoints
//! - `GET /_cache/stats` - Get cache statistics
//! - `GET /_cache/health` - Health check endpoint
//! - `DELETE /_cache` - Clear the cache
//! - `/<key>` - Look up a percent-encoded key, cache first

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
