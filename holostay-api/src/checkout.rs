use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderMap},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Serialize;
use uuid::Uuid;
use holostay_checkout::{CheckoutRequest, CheckoutResponse};
use holostay_core::payment::PaymentStatus;
use crate::{error::AppError, middleware::Caller, state::AppState};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub session_id: String,
    pub status: PaymentStatus,
    pub amount: f64,
    pub booking_id: Uuid,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/checkout/sessions", post(create_checkout_session))
        .route("/v1/checkout/sessions/{session_id}", get(get_checkout_session))
}

/// Redirects go back to whichever front end started the checkout
fn redirect_origin(headers: &HeaderMap, fallback: &str) -> String {
    headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && *v != "null")
        .unwrap_or(fallback)
        .trim_end_matches('/')
        .to_string()
}

/// POST /v1/checkout/sessions
/// Creates a pending booking and payment, and returns the hosted checkout URL
async fn create_checkout_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    headers: HeaderMap,
    body: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<Json<CheckoutResponse>, AppError> {
    // An unreadable body is treated as one with no fields so that the
    // authentication check still runs first
    let request = match body {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!("Checkout body rejected: {}", rejection.body_text());
            CheckoutRequest::default()
        }
    };

    let origin = redirect_origin(&headers, &state.public_url);
    let response = state
        .initiator
        .create_session(caller.identity(), request, &origin)
        .await?;

    Ok(Json(response))
}

/// GET /v1/checkout/sessions/{session_id}
/// Lets the success page poll for the webhook outcome
async fn get_checkout_session(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionStatusResponse>, AppError> {
    let identity = caller.require()?;

    let payment = state
        .payments
        .get_payment_by_session(&session_id)
        .await
        .map_err(AppError::internal)?
        .filter(|p| p.user_id == identity.user_id)
        .ok_or_else(|| AppError::NotFoundError("Checkout session not found".to_string()))?;

    Ok(Json(SessionStatusResponse {
        session_id: payment.session_id,
        status: payment.status,
        amount: payment.amount,
        booking_id: payment.booking_id,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_redirect_origin_prefers_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(redirect_origin(&headers, "https://holostay.app"), "https://holostay.app");

        headers.insert(header::ORIGIN, HeaderValue::from_static("http://localhost:5173/"));
        assert_eq!(redirect_origin(&headers, "https://holostay.app"), "http://localhost:5173");

        headers.insert(header::ORIGIN, HeaderValue::from_static("null"));
        assert_eq!(redirect_origin(&headers, "https://holostay.app"), "https://holostay.app");
    }
}
