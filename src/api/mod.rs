//! API Module
//!
//! Diagnostics HTTP surface over one cache instance.
//!
//! # Endpoints
//! - `PUT /set` - Store a JSON value
//! - `GET /get/:key` - Read a value back
//! - `DELETE /del/:key` - Remove a key cluster-wide
//! - `POST /purge` - Purge the cache cluster-wide
//! - `GET /keys` - Live keys, least recently used first
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
