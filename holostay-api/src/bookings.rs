use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::Serialize;
use uuid::Uuid;
use holostay_catalog::RoomSummary;
use holostay_core::booking::Booking;
use crate::{error::AppError, middleware::Caller, state::AppState};

#[derive(Debug, Serialize)]
pub struct BookingResponse {
    #[serde(flatten)]
    pub booking: Booking,
    pub room: Option<RoomSummary>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/bookings", get(list_bookings))
        .route("/v1/bookings/{id}", get(get_booking))
}

async fn with_room(state: &AppState, booking: Booking) -> BookingResponse {
    let room = match state.rooms.get_room(booking.room_id).await {
        Ok(room) => room.map(|r| r.summary()),
        Err(e) => {
            tracing::warn!("Failed to load room {} for booking {}: {}", booking.room_id, booking.id, e);
            None
        }
    };
    BookingResponse { booking, room }
}

/// GET /v1/bookings
/// The caller's bookings, newest first
async fn list_bookings(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let identity = caller.require()?;
    let bookings = state.bookings.list_bookings(identity.user_id).await.map_err(AppError::internal)?;

    let mut response = Vec::with_capacity(bookings.len());
    for booking in bookings {
        response.push(with_room(&state, booking).await);
    }
    Ok(Json(response))
}

/// GET /v1/bookings/{id}
async fn get_booking(
    State(state): State<AppState>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<String>,
) -> Result<Json<BookingResponse>, AppError> {
    let identity = caller.require()?;
    let not_found = || AppError::NotFoundError("Booking not found".to_string());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let booking = state
        .bookings
        .get_booking(id)
        .await
        .map_err(AppError::internal)?
        .filter(|b| b.user_id == identity.user_id)
        .ok_or_else(not_found)?;

    Ok(Json(with_room(&state, booking).await))
}
