use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{PgPool, Postgres, QueryBuilder};
use holostay_catalog::{Room, RoomError, RoomFilters};
use holostay_core::repository::RoomRepository;

const ROOM_COLUMNS: &str = "id, name, location, price_per_night, rating, amenities, max_guests, room_type, image_urls, description, created_at, updated_at";

pub struct StoreRoomRepository {
    pool: PgPool,
}

impl StoreRoomRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Internal struct for type-safe querying
#[derive(sqlx::FromRow)]
struct RoomRow {
    id: Uuid,
    name: String,
    location: String,
    price_per_night: f64,
    rating: Option<f64>,
    amenities: Option<Vec<String>>,
    max_guests: i32,
    room_type: String,
    image_urls: Option<Vec<String>>,
    description: Option<String>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<RoomRow> for Room {
    type Error = RoomError;

    fn try_from(row: RoomRow) -> Result<Self, Self::Error> {
        Ok(Room {
            id: row.id,
            name: row.name,
            location: row.location,
            price_per_night: row.price_per_night,
            rating: row.rating.unwrap_or(0.0),
            amenities: row.amenities.unwrap_or_default(),
            max_guests: row.max_guests,
            room_type: row.room_type.parse()?,
            image_urls: row.image_urls.unwrap_or_default(),
            description: row.description.unwrap_or_default(),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl RoomRepository for StoreRoomRepository {
    async fn list_rooms(
        &self,
        filters: &RoomFilters,
    ) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {} FROM rooms WHERE TRUE", ROOM_COLUMNS));

        if let Some(min) = filters.min_price() {
            query.push(" AND price_per_night >= ").push_bind(min);
        }
        if let Some(max) = filters.max_price() {
            query.push(" AND price_per_night <= ").push_bind(max);
        }
        if let Some(room_type) = filters.room_type() {
            query.push(" AND room_type = ").push_bind(room_type.to_ascii_lowercase());
        }
        if let Some(guests) = filters.guests() {
            query.push(" AND max_guests >= ").push_bind(guests);
        }
        if let Some(location) = filters.location() {
            query.push(" AND location ILIKE ").push_bind(format!("%{}%", location));
        }
        if !filters.amenities.is_empty() {
            query.push(" AND amenities @> ").push_bind(filters.amenities.clone());
        }
        query.push(" ORDER BY rating DESC NULLS LAST");

        let rows = query.build_query_as::<RoomRow>().fetch_all(&self.pool).await?;

        let rooms = rows
            .into_iter()
            .map(Room::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rooms)
    }

    async fn get_room(
        &self,
        id: Uuid,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let row: Option<RoomRow> =
            sqlx::query_as(&format!("SELECT {} FROM rooms WHERE id = $1", ROOM_COLUMNS))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(row) => Ok(Some(Room::try_from(row)?)),
            None => Ok(None),
        }
    }

    async fn list_amenities(
        &self,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let amenities: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT unnest(amenities) AS amenity FROM rooms ORDER BY amenity",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(amenities)
    }
}
