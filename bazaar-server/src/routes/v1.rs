use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use bazaar_core::Role;
use bazaar_core::api::routes::v1;

use crate::{
    AppState,
    users::{
        auth::{self, auth_middleware, require_role},
        policy_handlers, profile_handlers,
    },
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Public authentication endpoints
        .route(v1::auth::REGISTER, post(auth::handlers::register))
        .route(v1::auth::AUTHENTICATE, post(auth::handlers::authenticate))
        .route(v1::auth::CONFIRM_EMAIL, post(auth::handlers::confirm_email))
        .route(
            v1::auth::REQUEST_PASSWORD_RESET,
            post(auth::handlers::request_password_reset),
        )
        .route(
            v1::auth::CONFIRM_PASSWORD_RESET,
            post(auth::handlers::confirm_password_reset),
        )
        .route(v1::auth::REFRESH_TOKEN, post(auth::handlers::refresh_token))
        // Vendor profile updates carry their own access token in the body
        .route(v1::vendors::BY_EMAIL, put(profile_handlers::update_vendor))
        .merge(create_customer_routes(state.clone()))
        .merge(create_vendor_routes(state.clone()))
        .merge(create_admin_routes(state))
}

fn create_customer_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            v1::policy::CUSTOMER,
            post(policy_handlers::check_customer_policy),
        )
        .route(v1::customers::BY_EMAIL, put(profile_handlers::update_customer))
        .route_layer(middleware::from_fn(require_role(Role::Customer)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn create_vendor_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::policy::VENDOR, post(policy_handlers::check_vendor_policy))
        .route_layer(middleware::from_fn(require_role(Role::Vendor)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

fn create_admin_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(v1::policy::ADMIN, post(policy_handlers::check_admin_policy))
        .route(v1::users::BY_EMAIL, get(profile_handlers::get_user))
        .route_layer(middleware::from_fn(require_role(Role::Admin)))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
