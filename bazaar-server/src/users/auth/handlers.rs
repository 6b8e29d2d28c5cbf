use axum::{Json, extract::State, http::StatusCode};

use bazaar_core::domain::users::auth::domain::services::{
    AuthenticationOutcome, ConfirmEmailOutcome, ConfirmPasswordResetOutcome,
    PasswordResetOutcome, RefreshTokenOutcome, RegisterOutcome,
};
use bazaar_core::domain::users::{
    AuthenticationRequest, ConfirmEmailRequest, ConfirmPasswordResetRequest,
    PasswordResetRequest, RefreshTokenRequest, RegisterRequest, TokenPair,
};

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> AppResult<StatusCode> {
    request.validate()?;

    match state.accounts().register(request).await {
        RegisterOutcome::Success => Ok(StatusCode::OK),
        RegisterOutcome::EmailAlreadyExists => {
            Err(AppError::conflict("Email already registered"))
        }
        RegisterOutcome::EmailCantBeSend => Err(AppError::bad_request(
            "Confirmation email could not be sent",
        )),
        RegisterOutcome::SystemError => {
            Err(AppError::internal("Account could not be created"))
        }
    }
}

pub async fn authenticate(
    State(state): State<AppState>,
    Json(request): Json<AuthenticationRequest>,
) -> AppResult<Json<TokenPair>> {
    request.validate()?;

    match state.accounts().authenticate(request).await {
        AuthenticationOutcome::Success(pair) => Ok(Json(pair)),
        AuthenticationOutcome::EmailNotFound => {
            Err(AppError::not_found("Email not found"))
        }
        AuthenticationOutcome::WrongPassword => {
            Err(AppError::unauthorized("Wrong password"))
        }
        AuthenticationOutcome::Unexpected => Err(AppError::unexpected()),
    }
}

pub async fn confirm_email(
    State(state): State<AppState>,
    Json(request): Json<ConfirmEmailRequest>,
) -> AppResult<StatusCode> {
    request.validate()?;

    match state.accounts().confirm_email(request).await {
        ConfirmEmailOutcome::Success => Ok(StatusCode::OK),
        ConfirmEmailOutcome::EmailNotFound => {
            Err(AppError::not_found("Email not found"))
        }
        ConfirmEmailOutcome::InvalidToken => {
            Err(AppError::unauthorized("Invalid confirmation token"))
        }
        ConfirmEmailOutcome::Unexpected => Err(AppError::unexpected()),
    }
}

pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequest>,
) -> AppResult<StatusCode> {
    request.validate()?;

    match state.accounts().request_password_reset(request).await {
        PasswordResetOutcome::Success => Ok(StatusCode::OK),
        PasswordResetOutcome::EmailNotFound => {
            Err(AppError::not_found("Email not found"))
        }
        PasswordResetOutcome::EmailCantBeSend => Err(AppError::bad_request(
            "Password reset email could not be sent",
        )),
        PasswordResetOutcome::Unexpected => Err(AppError::unexpected()),
    }
}

pub async fn confirm_password_reset(
    State(state): State<AppState>,
    Json(request): Json<ConfirmPasswordResetRequest>,
) -> AppResult<StatusCode> {
    request.validate()?;

    match state.accounts().confirm_password_reset(request).await {
        ConfirmPasswordResetOutcome::Success => Ok(StatusCode::OK),
        ConfirmPasswordResetOutcome::EmailNotFound => {
            Err(AppError::not_found("Email not found"))
        }
        ConfirmPasswordResetOutcome::UnsupportedPasswordFormat => Err(
            AppError::bad_request("Password reset could not be applied"),
        ),
        ConfirmPasswordResetOutcome::Unexpected => Err(AppError::unexpected()),
    }
}

pub async fn refresh_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshTokenRequest>,
) -> AppResult<Json<TokenPair>> {
    request.validate()?;

    match state.tokens().refresh(&request.refresh_token).await {
        RefreshTokenOutcome::Success(pair) => Ok(Json(pair)),
        RefreshTokenOutcome::EmailNotFound => {
            Err(AppError::not_found("Refresh token not recognised"))
        }
        RefreshTokenOutcome::Expired => {
            Err(AppError::unauthorized("Refresh token expired"))
        }
        RefreshTokenOutcome::Unexpected => Err(AppError::unexpected()),
    }
}
