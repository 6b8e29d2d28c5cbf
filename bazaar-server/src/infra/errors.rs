use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use bazaar_core::domain::users::ValidationError;

pub type AppResult<T> = Result<T, AppError>;

/// A failed request: the status to answer with and a client-safe detail.
#[derive(Debug, Error)]
#[error("{status}: {message}")]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

/// `{"detail": .., "status": ..}`
#[derive(Serialize)]
struct ProblemBody<'a> {
    detail: &'a str,
    status: u16,
}

macro_rules! status_constructors {
    ($($name:ident => $status:ident),* $(,)?) => {
        $(
            pub fn $name(message: impl Into<String>) -> Self {
                Self::new(StatusCode::$status, message)
            }
        )*
    };
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    status_constructors! {
        bad_request => BAD_REQUEST,
        unauthorized => UNAUTHORIZED,
        forbidden => FORBIDDEN,
        not_found => NOT_FOUND,
        conflict => CONFLICT,
        internal => INTERNAL_SERVER_ERROR,
    }

    /// 500 with a fixed detail; the cause belongs in the log, not the body.
    pub fn unexpected() -> Self {
        Self::internal("An unexpected error occurred")
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ProblemBody {
            detail: &self.message,
            status: self.status.as_u16(),
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        tracing::error!(error = ?err, "request failed");
        Self::unexpected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn conflict_carries_detail_and_status() {
        let (status, body) =
            body_of(AppError::conflict("Email already registered")).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "Email already registered");
        assert_eq!(body["status"], 409);
    }

    #[tokio::test]
    async fn anyhow_errors_hide_their_cause() {
        let err: AppError = anyhow::anyhow!("store lock poisoned").into();
        let (status, body) = body_of(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["detail"], "An unexpected error occurred");
    }

    #[test]
    fn validation_errors_are_bad_requests() {
        let err: AppError = ValidationError::Missing("email").into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }
}
