//! Response models for the proxy's admin endpoints
//!
//! Cache hits are served as raw payloads; only admin routes and errors
//! answer with JSON.

pub mod responses;

// Re-export commonly used types
pub use responses::{ClearResponse, ErrorResponse, HealthResponse, StatsResponse};
