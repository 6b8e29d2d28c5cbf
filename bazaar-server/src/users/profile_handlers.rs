use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use bazaar_core::domain::users::auth::domain::services::{
    UpdateUserInfoOutcome, UserInfoOutcome,
};
use bazaar_core::domain::users::{
    UpdateCustomerRequest, UpdateVendorRequest, UserInfo,
};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

/// Admin-only profile read.
pub async fn get_user(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> AppResult<Json<UserInfo>> {
    match state.accounts().get_user_info(&email).await {
        UserInfoOutcome::Success(info) => Ok(Json(info)),
        UserInfoOutcome::EmailNotFound => Err(AppError::not_found("Email not found")),
        UserInfoOutcome::UserIsAdmin => {
            Err(AppError::not_found("Admin accounts have no profile"))
        }
        UserInfoOutcome::CustomerNotInitialized => {
            Err(AppError::not_found("Customer profile not initialised"))
        }
        UserInfoOutcome::VendorNotInitialized => {
            Err(AppError::not_found("Vendor profile not initialised"))
        }
        UserInfoOutcome::Unexpected => Err(AppError::unexpected()),
    }
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<UpdateCustomerRequest>,
) -> AppResult<StatusCode> {
    update_response(state.accounts().update_customer_info(&email, request).await)
}

pub async fn update_vendor(
    State(state): State<AppState>,
    Path(email): Path<String>,
    Json(request): Json<UpdateVendorRequest>,
) -> AppResult<StatusCode> {
    update_response(state.accounts().update_vendor_info(&email, request).await)
}

fn update_response(outcome: UpdateUserInfoOutcome) -> AppResult<StatusCode> {
    match outcome {
        UpdateUserInfoOutcome::Success => Ok(StatusCode::OK),
        UpdateUserInfoOutcome::InvalidToken => {
            Err(AppError::unauthorized("Invalid or expired access token"))
        }
        UpdateUserInfoOutcome::EmailNotFound => Err(AppError::not_found("Email not found")),
        UpdateUserInfoOutcome::UserIsAdmin => {
            Err(AppError::not_found("Admin accounts have no profile"))
        }
        UpdateUserInfoOutcome::WrongUserType => {
            Err(AppError::forbidden("Profile kind does not match the account"))
        }
        UpdateUserInfoOutcome::InvalidProfile(err) => Err(err.into()),
        UpdateUserInfoOutcome::Unexpected => Err(AppError::unexpected()),
    }
}
