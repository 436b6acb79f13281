use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::room::Room;

/// Browse/search criteria. Every field is optional; zero or empty values are
/// treated as "not set".
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RoomFilters {
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    #[serde(default)]
    pub amenities: Vec<String>,
    pub room_type: Option<String>,
    pub guests: Option<i32>,
    pub location: Option<String>,
}

impl RoomFilters {
    pub fn min_price(&self) -> Option<f64> {
        self.min_price.filter(|p| *p > 0.0)
    }

    pub fn max_price(&self) -> Option<f64> {
        self.max_price.filter(|p| *p > 0.0)
    }

    /// `None` when the filter is absent or set to `all`
    pub fn room_type(&self) -> Option<&str> {
        self.room_type
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("all"))
    }

    pub fn guests(&self) -> Option<i32> {
        self.guests.filter(|g| *g > 0)
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref().map(str::trim).filter(|l| !l.is_empty())
    }

    pub fn matches(&self, room: &Room) -> bool {
        if let Some(min) = self.min_price() {
            if room.price_per_night < min {
                return false;
            }
        }

        if let Some(max) = self.max_price() {
            if room.price_per_night > max {
                return false;
            }
        }

        if let Some(room_type) = self.room_type() {
            if !room.room_type.as_str().eq_ignore_ascii_case(room_type) {
                return false;
            }
        }

        if let Some(guests) = self.guests() {
            if room.max_guests < guests {
                return false;
            }
        }

        if let Some(location) = self.location() {
            if !room.location.to_lowercase().contains(&location.to_lowercase()) {
                return false;
            }
        }

        self.amenities.iter().all(|amenity| room.has_amenity(amenity))
    }

    pub fn apply(&self, rooms: impl IntoIterator<Item = Room>) -> Vec<Room> {
        let mut matched: Vec<Room> = rooms.into_iter().filter(|r| self.matches(r)).collect();
        sort_by_rating(&mut matched);
        matched
    }
}

/// Highest rated first
pub fn sort_by_rating(rooms: &mut [Room]) {
    rooms.sort_by(|a, b| b.rating.total_cmp(&a.rating));
}

pub fn collect_amenities<'a>(rooms: impl IntoIterator<Item = &'a Room>) -> Vec<String> {
    let unique: BTreeSet<&str> = rooms
        .into_iter()
        .flat_map(|r| r.amenities.iter().map(String::as_str))
        .collect();
    unique.into_iter().map(String::from).collect()
}
