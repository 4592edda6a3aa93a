//! API Handlers
//!
//! HTTP request handlers for each diagnostics endpoint.

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::{Cache, Expiry};
use crate::codec::DynamicValue;
use crate::error::{CacheError, Result};
use crate::models::{
    validate_key, DeleteResponse, GetResponse, HealthResponse, KeysResponse, PurgeResponse,
    SetRequest, SetResponse, StatsResponse,
};

/// Application state shared across all handlers.
///
/// `Cache` handles are internally synchronized, so the state holds one
/// directly.
#[derive(Clone, Debug)]
pub struct AppState {
    pub cache: Cache,
}

impl AppState {
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }
}

/// Handler for PUT /set
///
/// Stores a JSON value. `ttl` absent uses the cache default; `ttl: 0`
/// never expires.
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let expiry = match req.ttl {
        Some(secs) => Expiry::After(Duration::from_secs(secs)),
        None => Expiry::Default,
    };
    state.cache.set_with(req.key.clone(), &req.value, expiry)?;

    Ok(Json(SetResponse::new(req.key)))
}

/// Handler for GET /get/:key
///
/// Reads a value back generically; integers are reported as i64.
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    let value: DynamicValue = state.cache.get(&key)?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for DELETE /del/:key
///
/// Removes a key here and on every peer. Succeeds whether or not this node
/// held the key.
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    if let Some(error_msg) = validate_key(&key) {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let removed = state.cache.remove(&key);

    Ok(Json(DeleteResponse::new(key, removed)))
}

/// Handler for POST /purge
pub async fn purge_handler(State(state): State<AppState>) -> Json<PurgeResponse> {
    state.cache.purge();
    Json(PurgeResponse::new())
}

/// Handler for GET /keys
///
/// Lists live keys in recency order, least recently used first.
pub async fn keys_handler(State(state): State<AppState>) -> Json<KeysResponse> {
    Json(KeysResponse::new(state.cache.keys()))
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::from(state.cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.cache.node_id()))
}
