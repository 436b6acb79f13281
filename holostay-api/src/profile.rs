use axum::{routing::get, Extension, Json, Router};
use serde::Serialize;
use uuid::Uuid;
use holostay_shared::Masked;
use crate::{error::AppError, middleware::Caller, state::AppState};

#[derive(Debug, Serialize)]
struct ProfileResponse {
    user_id: Uuid,
    email: Option<Masked<String>>,
    display_name: String,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/v1/me", get(me))
}

/// GET /v1/me
async fn me(Extension(caller): Extension<Caller>) -> Result<Json<ProfileResponse>, AppError> {
    let identity = caller.require()?;
    Ok(Json(ProfileResponse {
        user_id: identity.user_id,
        email: identity.email.clone(),
        display_name: identity.display_name(),
    }))
}
