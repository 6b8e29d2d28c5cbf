use std::future::Future;
use std::pin::Pin;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use bazaar_core::Role;
use bazaar_core::domain::users::auth::domain::value_objects::AccessClaims;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Verifies the bearer access token and stores its claims in the request
/// extensions for the handlers and role gates that follow.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = extract_bearer_token(&request)?;
    let claims = state.tokens().decode_access_token(token).map_err(|err| {
        debug!(error = %err, "bearer token rejected");
        AppError::unauthorized("Invalid or expired access token")
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Role gate. Must run AFTER [`auth_middleware`] in the layer stack.
pub fn require_role(
    role: Role,
) -> impl Fn(Request, Next) -> Pin<Box<dyn Future<Output = Response> + Send>>
+ Clone
+ Send
+ Sync
+ 'static {
    move |request: Request, next: Next| Box::pin(check_role_async(request, next, role))
}

async fn check_role_async(request: Request, next: Next, role: Role) -> Response {
    let Some(claims) = request.extensions().get::<AccessClaims>() else {
        return AppError::unauthorized("Authentication required").into_response();
    };

    if !claims.has_role(role) {
        return AppError::forbidden(format!("Role '{role}' required")).into_response();
    }

    next.run(request).await
}

fn extract_bearer_token(request: &Request) -> AppResult<&str> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| AppError::unauthorized("Missing bearer token"))
}
