//! Error types for the cache proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::backend::StoreError;
use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Errors raised by the cache core. Only construction can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Negative expiry or capacity
    #[error("Invalid cache configuration: {0}")]
    InvalidConfiguration(String),
}

// == Config Error Enum ==
/// Errors raised while loading the proxy configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file exists but could not be read
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the expected shape
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    /// An environment override could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },
}

// == Gateway Error Enum ==
/// Errors surfaced to HTTP clients by the cache-aside gateway.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Request path could not be decoded into a key
    #[error("Invalid key encoding: {0}")]
    BadRequest(String),

    /// Backing store has no value for the key
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Backing store failed
    #[error("Backing store error: {0}")]
    Store(#[from] StoreError),
}

// == IntoResponse Implementation ==
impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            GatewayError::BadRequest(_) => StatusCode::BAD_REQUEST,
            GatewayError::NotFound(_) => StatusCode::NOT_FOUND,
            GatewayError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache core.
pub type Result<T> = std::result::Result<T, CacheError>;
