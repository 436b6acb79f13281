use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};
use holostay_checkout::{signature::SIGNATURE_HEADER, ReconcileOutcome};
use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/webhooks/stripe", post(payment_webhook))
}

/// POST /v1/webhooks/stripe
/// Signature and envelope failures are refused; everything else is acknowledged
async fn payment_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
    let now = chrono::Utc::now().timestamp();

    match state.reconciler.handle(&body, signature, now).await? {
        ReconcileOutcome::Applied { kind, session_id, booking_updated, .. } => {
            tracing::info!(
                "Webhook {:?} for session {} applied (booking updated: {})",
                kind,
                session_id,
                booking_updated
            );
        }
        ReconcileOutcome::Ignored { event_type } => {
            tracing::debug!("Webhook {} acknowledged without changes", event_type);
        }
    }

    Ok(Json(json!({ "received": true })))
}
