//! # Routes
//!
//! Axum router configuration for the payment relay.

use crate::handlers;
use crate::state::{AppConfig, AppState};
use axum::{
    extract::Request,
    http::{HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Create the main application router
///
/// Routes:
/// - GET  /health   - Liveness
/// - GET  /config   - Effective configuration (API key masked)
/// - POST /approve  - Approve a payment on the platform
/// - POST /complete - Complete a payment on the platform
///
/// `OPTIONS` on any path is answered by the CORS layer with `204 No Content`.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::config))
        .route("/approve", post(handlers::approve))
        .route("/complete", post(handlers::complete))
        .fallback(handlers::not_found)
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(options_no_content))
                .layer(cors),
        )
        // State
        .with_state(state)
}

/// CORS for the configured origins.
///
/// A `*` entry allows every origin. Otherwise only listed origins receive
/// CORS headers; requests without an `Origin` header are served as usual.
pub fn cors_layer(config: &AppConfig) -> CorsLayer {
    let allow_origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {:?}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(AllowHeaders::mirror_request())
}

/// The CORS layer answers every `OPTIONS` with an empty `200`; report it as `204`.
async fn options_no_content(request: Request, next: Next) -> Response {
    let is_options = request.method() == Method::OPTIONS;
    let mut response = next.run(request).await;
    if is_options && response.status() == StatusCode::OK {
        *response.status_mut() = StatusCode::NO_CONTENT;
    }
    response
}
