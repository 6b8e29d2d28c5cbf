use axum::{Json, extract::State, http::StatusCode};
use tracing::debug;

use bazaar_core::Role;
use bazaar_core::domain::users::CheckPolicyRequest;
use bazaar_core::domain::users::auth::domain::services::PolicyOutcome;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

async fn check(state: &AppState, token: &str, role: Role) -> AppResult<StatusCode> {
    match state.policy().check_policy(token, role).await {
        PolicyOutcome::Success => Ok(StatusCode::OK),
        PolicyOutcome::Failure(denial) => {
            debug!(%role, %denial, "policy check denied");
            Err(AppError::unauthorized(format!("Policy '{role}' not satisfied")))
        }
        PolicyOutcome::Unexpected => Err(AppError::unexpected()),
    }
}

pub async fn check_customer_policy(
    State(state): State<AppState>,
    Json(request): Json<CheckPolicyRequest>,
) -> AppResult<StatusCode> {
    check(&state, &request.token, Role::Customer).await
}

pub async fn check_vendor_policy(
    State(state): State<AppState>,
    Json(request): Json<CheckPolicyRequest>,
) -> AppResult<StatusCode> {
    check(&state, &request.token, Role::Vendor).await
}

pub async fn check_admin_policy(
    State(state): State<AppState>,
    Json(request): Json<CheckPolicyRequest>,
) -> AppResult<StatusCode> {
    check(&state, &request.token, Role::Admin).await
}
