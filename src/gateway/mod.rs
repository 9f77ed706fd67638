//! HTTP gateway (Axum) exposing the pipeline as a server-sent event stream.
//!
//! This module is primarily used by the `crosscheck` server binary.

pub mod error;
pub mod handler;
pub mod state;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::GatewayError;
pub use handler::crawl_handler;
pub use state::HandlerState;

use crate::constants::{CROSSCHECK_STATUS_HEADER, CROSSCHECK_STATUS_HEALTHY};
use crate::discovery::SearchProvider;
use crate::extraction::ContentExtractor;
use crate::inference::InferenceBackend;

/// Builds the router. Any origin may call it; the usual caller is a browser extension.
pub fn create_router_with_state<E, S, I>(state: HandlerState<E, S, I>) -> Router
where
    E: ContentExtractor + 'static,
    S: SearchProvider + 'static,
    I: InferenceBackend + 'static,
{
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/crawl", get(crawl_handler::<E, S, I>))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        CROSSCHECK_STATUS_HEADER,
        HeaderValue::from_static(CROSSCHECK_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
