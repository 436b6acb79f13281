use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Accommodation categories offered in the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum RoomType {
    Hotel,
    Apartment,
    Suite,
}

impl RoomType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomType::Hotel => "hotel",
            RoomType::Apartment => "apartment",
            RoomType::Suite => "suite",
        }
    }
}

impl fmt::Display for RoomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomType {
    type Err = RoomError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "hotel" => Ok(RoomType::Hotel),
            "apartment" => Ok(RoomType::Apartment),
            "suite" => Ok(RoomType::Suite),
            other => Err(RoomError::UnknownType(other.to_string())),
        }
    }
}

/// A bookable room. Read-only from the booking flow's perspective.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Room {
    pub id: Uuid,
    pub name: String,
    pub location: String,
    pub price_per_night: f64,
    pub rating: f64,
    pub amenities: Vec<String>,
    pub max_guests: i32,
    pub room_type: RoomType,
    pub image_urls: Vec<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Room {
    pub fn has_amenity(&self, amenity: &str) -> bool {
        self.amenities.iter().any(|a| a == amenity)
    }

    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            name: self.name.clone(),
            location: self.location.clone(),
            image_urls: self.image_urls.clone(),
        }
    }
}

/// The slice of a room shown next to a booking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoomSummary {
    pub name: String,
    pub location: String,
    pub image_urls: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    #[error("Unknown room type: {0}")]
    UnknownType(String),
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_parsing() {
        assert_eq!("suite".parse::<RoomType>().unwrap(), RoomType::Suite);
        assert_eq!("Hotel".parse::<RoomType>().unwrap(), RoomType::Hotel);
        assert!("spaceship".parse::<RoomType>().is_err());
    }

    #[test]
    fn test_room_type_serializes_lowercase() {
        let json = serde_json::to_string(&RoomType::Apartment).unwrap();
        assert_eq!(json, "\"apartment\"");
    }
}
