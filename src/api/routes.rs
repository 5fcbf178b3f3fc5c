//! HTTP API routes: operational visibility into a running node.

use crate::network::node::NodeStatus;
use crate::network::Node;
use axum::{extract::State, routing::get, Json, Router};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared state the API handlers read from. Holds only an `Arc` to the
/// running node; the API never mutates sync engine state directly.
#[derive(Clone)]
pub struct ApiState {
    pub node: Arc<Node>,
}

async fn health_check() -> &'static str {
    "ok"
}

async fn status(State(state): State<ApiState>) -> Json<NodeStatus> {
    Json(state.node.status().await)
}

/// Build the router: `/health` for liveness, `/status` for sync progress.
pub fn create_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
        .with_state(state)
        .layer(cors)
}
