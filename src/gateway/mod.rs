//! Request gateway: shared state, router construction and middleware.

mod handlers;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::credentials::CredentialStore;
use crate::error::GatewayError;
use crate::token::SessionTokenService;
use crate::upstream::UpstreamClient;

/// Shared state cloned into every request handler.
///
/// Everything here is immutable after startup; request handling holds no
/// other state.
#[derive(Clone)]
pub struct GatewayState {
    /// Session token mint/verify service.
    pub tokens: Arc<SessionTokenService>,
    /// Active credential backend.
    pub credentials: Arc<dyn CredentialStore>,
    /// Upstream proxy client.
    pub upstream: Arc<UpstreamClient>,
}

/// Builds the application router with tracing, CORS and timeout middleware.
pub fn router(
    state: GatewayState,
    allowed_origin: &str,
    request_timeout: Duration,
) -> Result<Router, GatewayError> {
    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origin)?)
        .layer(TimeoutLayer::new(request_timeout));

    Ok(Router::new()
        .route(
            "/api",
            post(handlers::service_info)
                .get(handlers::route_echo_root)
                .fallback(handlers::method_not_allowed),
        )
        .route(
            "/api/{route}",
            post(handlers::dispatch)
                .get(handlers::route_echo)
                .fallback(handlers::method_not_allowed),
        )
        .fallback(handlers::not_found)
        .layer(middleware)
        .with_state(state))
}

/// CORS policy: `*` allows any origin, otherwise exactly the configured one.
fn cors_layer(allowed_origin: &str) -> Result<CorsLayer, GatewayError> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86_400));

    if allowed_origin == "*" {
        Ok(layer.allow_origin(Any))
    } else {
        let origin = allowed_origin
            .parse::<HeaderValue>()
            .map_err(|e| GatewayError::Internal(anyhow::anyhow!("ALLOWED_ORIGIN: {e}")))?;
        Ok(layer.allow_origin(origin))
    }
}
