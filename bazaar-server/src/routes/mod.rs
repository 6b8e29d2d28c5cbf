pub mod v1;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

/// Create the main API router with all versions
pub fn create_api_router(state: AppState) -> Router<AppState> {
    // v1 route constants already carry their `/api/v1` prefix
    v1::create_v1_router(state)
}

/// The full application: API routes, CORS, and request tracing.
pub fn create_app(state: AppState) -> Router {
    let cors_layer = cors_layer(&state);

    create_api_router(state.clone())
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// Permissive in dev, allow-list otherwise
fn cors_layer(state: &AppState) -> CorsLayer {
    if state.config().dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = state
        .config()
        .cors_allowed_origins
        .iter()
        .filter_map(|s| HeaderValue::from_str(s).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let allow_headers: [HeaderName; 2] = [header::AUTHORIZATION, header::CONTENT_TYPE];

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers(allow_headers)
}
