//! API Handlers
//!
//! Cache-aside lookup handler plus the admin endpoints.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::{debug, info, warn};

use crate::backend::BackingStore;
use crate::cache::BoundedExpiringCache;
use crate::config::Config;
use crate::error::{CacheError, GatewayError};
use crate::models::{ClearResponse, HealthResponse, StatsResponse};

/// Cache of raw payloads keyed by decoded request path.
pub type ResponseCache = BoundedExpiringCache<String, Bytes>;

/// Application state shared across all handlers.
///
/// The cache carries its own lock, so handlers share it through a plain `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Read-through cache in front of the backing store
    pub cache: Arc<ResponseCache>,
    /// Source of truth for cache misses
    pub backend: Arc<dyn BackingStore>,
}

impl AppState {
    /// Creates a new AppState from a cache and a backing store.
    pub fn new(cache: ResponseCache, backend: Arc<dyn BackingStore>) -> Self {
        Self {
            cache: Arc::new(cache),
            backend,
        }
    }

    /// Creates a new AppState with a cache sized from configuration.
    ///
    /// Fails if the configured expiry or capacity is negative.
    pub fn from_config(config: &Config, backend: Arc<dyn BackingStore>) -> Result<Self, CacheError> {
        let cache = ResponseCache::new(config.cache_expiry, config.cache_capacity)?;
        Ok(Self::new(cache, backend))
    }
}

/// Percent-decodes a request path (minus its leading `/`) into a cache key.
///
/// A `%` not followed by two hex digits, or an escape sequence that decodes
/// to invalid UTF-8, is rejected.
pub fn decode_key(path: &str) -> Result<String, GatewayError> {
    let raw = path.strip_prefix('/').unwrap_or(path);

    for (pos, _) in raw.match_indices('%') {
        let escape = raw.as_bytes().get(pos + 1..pos + 3);
        let well_formed = escape.is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit));
        if !well_formed {
            return Err(GatewayError::BadRequest(format!(
                "malformed escape at byte {} of {:?}",
                pos, raw
            )));
        }
    }

    urlencoding::decode(raw)
        .map(|key| key.into_owned())
        .map_err(|e| GatewayError::BadRequest(e.to_string()))
}

/// Fallback handler: every non-admin request is a cache lookup.
///
/// Serves the cached payload on a hit. On a miss it fetches from the backing
/// store, caches the value and serves it.
pub async fn proxy_handler(
    State(state): State<AppState>,
    uri: Uri,
) -> Result<Response, GatewayError> {
    let key = decode_key(uri.path())?;

    if let Some(value) = state.cache.get(key.as_str()) {
        debug!(key = %key, "cache hit");
        return Ok(payload_response(value));
    }

    debug!(key = %key, "cache miss, fetching from backing store");
    match state.backend.fetch(&key).await {
        Ok(Some(value)) => {
            state.cache.set(key, value.clone());
            Ok(payload_response(value))
        }
        Ok(None) => Err(GatewayError::NotFound(key)),
        Err(e) => {
            warn!(key = %key, error = %e, "backing store fetch failed");
            Err(e.into())
        }
    }
}

fn payload_response(value: Bytes) -> Response {
    ([(header::CONTENT_TYPE, "application/octet-stream")], value).into_response()
}

/// Handler for GET /_cache/stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for DELETE /_cache
///
/// Drops every cached key; the backing store is untouched.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear();
    info!("Cache cleared");
    Json(ClearResponse::cleared())
}

/// Handler for GET /_cache/health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
