use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderName, HeaderValue, Method};
use tokio::sync::watch;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveRequestHeadersLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tower_http::trace::{DefaultOnFailure, DefaultOnResponse};
use tower_http::LatencyUnit;

mod config;
pub mod error;
mod handlers;
mod health;
mod nouns;

pub use config::Config;
pub use error::ApiError;
pub use nouns::NOUN_PREFIX;

use crate::ServiceState;

/// Maximum request body size in bytes (50 MB)
pub const MAX_UPLOAD_SIZE_BYTES: usize = 50 * 1024 * 1024;

const POWERED_BY: &str = "nouns";

/// The complete service: status routes, noun routes and the layers every
/// response passes through. Request tracing is added by [`run_api`].
pub fn router(state: ServiceState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(vec![Method::GET, Method::PUT, Method::POST, Method::DELETE])
        .allow_headers(vec![CONTENT_TYPE, AUTHORIZATION])
        .allow_origin(Any);

    Router::new()
        .nest(health::STATUS_PREFIX, health::router())
        .nest(NOUN_PREFIX, nouns::router())
        .route("/fail", get(handlers::fail_handler))
        .fallback(handlers::not_found_handler)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE_BYTES))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-powered-by"),
            HeaderValue::from_static(POWERED_BY),
        ))
        .layer(CompressionLayer::new())
        .layer(cors)
}

/// Run the HTTP server until the shutdown signal fires.
pub async fn run_api(
    config: Config,
    state: ServiceState,
    mut shutdown_rx: watch::Receiver<()>,
) -> Result<(), HttpServerError> {
    let listen_addr = config.listen_addr;
    let log_level = config.log_level;
    let trace_layer = TraceLayer::new_for_http()
        .on_response(
            DefaultOnResponse::new()
                .include_headers(false)
                .level(log_level)
                .latency_unit(LatencyUnit::Micros),
        )
        .on_failure(DefaultOnFailure::new().latency_unit(LatencyUnit::Micros));

    let router = router(state)
        .layer(trace_layer)
        .layer(SetSensitiveRequestHeadersLayer::new([AUTHORIZATION]));

    tracing::info!(addr = ?listen_addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            let _ = shutdown_rx.changed().await;
        })
        .await?;

    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum HttpServerError {
    #[error("an error occurred running the HTTP server: {0}")]
    ServingFailed(#[from] std::io::Error),
}
