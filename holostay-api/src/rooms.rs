use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use holostay_catalog::{Room, RoomFilters};
use crate::{error::AppError, state::AppState};

/// Query string for `GET /v1/rooms`; amenities arrive comma separated
#[derive(Debug, Default, Deserialize)]
pub struct RoomQuery {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub amenities: Option<String>,
    pub room_type: Option<String>,
    pub guests: Option<i32>,
    pub location: Option<String>,
}

impl From<RoomQuery> for RoomFilters {
    fn from(query: RoomQuery) -> Self {
        RoomFilters {
            min_price: query.min_price,
            max_price: query.max_price,
            amenities: query
                .amenities
                .map(|list| {
                    list.split(',')
                        .map(str::trim)
                        .filter(|a| !a.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
            room_type: query.room_type,
            guests: query.guests,
            location: query.location,
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/rooms", get(list_rooms))
        .route("/v1/rooms/{id}", get(get_room))
        .route("/v1/amenities", get(list_amenities))
}

/// GET /v1/rooms
async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> Result<Json<Vec<Room>>, AppError> {
    let filters = RoomFilters::from(query);
    let rooms = state.rooms.list_rooms(&filters).await.map_err(AppError::internal)?;
    Ok(Json(rooms))
}

/// GET /v1/rooms/{id}
async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Room>, AppError> {
    let not_found = || AppError::NotFoundError("Room not found".to_string());
    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    state
        .rooms
        .get_room(id)
        .await
        .map_err(AppError::internal)?
        .map(Json)
        .ok_or_else(not_found)
}

/// GET /v1/amenities
async fn list_amenities(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    let amenities = state.rooms.list_amenities().await.map_err(AppError::internal)?;
    Ok(Json(amenities))
}
