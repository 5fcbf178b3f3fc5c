//! HTTP status API
//!
//! Exposes operational visibility into a running node over HTTP. This is
//! deliberately small: the sync engine itself is driven by the CLI/Controller,
//! not the API.
//!
//! # Endpoints
//!
//! - `GET /health` - liveness check
//! - `GET /status` - current height, sync target, and peer count

pub mod routes;

pub use routes::{create_router, ApiState};
