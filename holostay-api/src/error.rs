use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use holostay_checkout::{CheckoutError, ReconcileError};

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    ValidationError(String),
    NotFoundError(String),
    InternalServerError(String),
}

impl AppError {
    pub fn unauthenticated() -> Self {
        AppError::AuthenticationError("Authentication required".to_string())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CheckoutError> for AppError {
    fn from(err: CheckoutError) -> Self {
        match err {
            CheckoutError::Unauthenticated => AppError::unauthenticated(),
            CheckoutError::Validation(msg) => AppError::ValidationError(msg),
            CheckoutError::RoomNotFound => AppError::NotFoundError(err.to_string()),
            CheckoutError::Upstream(_) | CheckoutError::Persistence(_) => AppError::internal(err),
        }
    }
}

impl From<ReconcileError> for AppError {
    fn from(err: ReconcileError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkout_errors_map_to_statuses() {
        let cases = [
            (CheckoutError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (CheckoutError::missing_fields(), StatusCode::BAD_REQUEST),
            (CheckoutError::RoomNotFound, StatusCode::NOT_FOUND),
            (CheckoutError::Upstream("timeout".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (CheckoutError::Persistence("insert failed".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
