//! In-process repositories for local development (`store.backend = "memory"`)
//! and for tests. Same guarded-transition semantics as the Postgres store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;
use holostay_catalog::{collect_amenities, Room, RoomFilters, RoomType};
use holostay_core::booking::{Booking, BookingStatus, NewBooking};
use holostay_core::payment::{NewPayment, Payment, PaymentStatus};
use holostay_core::repository::{BookingRepository, PaymentRepository, RoomRepository};

#[derive(Default)]
pub struct MemoryRoomRepository {
    rooms: RwLock<HashMap<Uuid, Room>>,
}

impl MemoryRoomRepository {
    pub fn new(rooms: Vec<Room>) -> Self {
        Self {
            rooms: RwLock::new(rooms.into_iter().map(|r| (r.id, r)).collect()),
        }
    }

    /// Catalog preloaded with the themed demo rooms
    pub fn seeded() -> Self {
        Self::new(themed_rooms())
    }

    pub async fn insert(&self, room: Room) {
        self.rooms.write().await.insert(room.id, room);
    }
}

#[async_trait]
impl RoomRepository for MemoryRoomRepository {
    async fn list_rooms(
        &self,
        filters: &RoomFilters,
    ) -> Result<Vec<Room>, Box<dyn std::error::Error + Send + Sync>> {
        let rooms = self.rooms.read().await;
        Ok(filters.apply(rooms.values().cloned()))
    }

    async fn get_room(
        &self,
        id: Uuid,
    ) -> Result<Option<Room>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.rooms.read().await.get(&id).cloned())
    }

    async fn list_amenities(
        &self,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let rooms = self.rooms.read().await;
        Ok(collect_amenities(rooms.values()))
    }
}

#[derive(Default)]
pub struct MemoryBookingRepository {
    bookings: RwLock<HashMap<Uuid, Booking>>,
}

impl MemoryBookingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.bookings.read().await.len()
    }

    pub async fn all(&self) -> Vec<Booking> {
        self.bookings.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl BookingRepository for MemoryBookingRepository {
    async fn create_booking(
        &self,
        booking: &NewBooking,
    ) -> Result<Booking, Box<dyn std::error::Error + Send + Sync>> {
        let created = booking.clone().into_booking(Uuid::new_v4(), Utc::now());
        self.bookings.write().await.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_booking(
        &self,
        id: Uuid,
    ) -> Result<Option<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.bookings.read().await.get(&id).cloned())
    }

    async fn list_bookings(
        &self,
        user_id: Uuid,
    ) -> Result<Vec<Booking>, Box<dyn std::error::Error + Send + Sync>> {
        let mut bookings: Vec<Booking> = self
            .bookings
            .read()
            .await
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(bookings)
    }

    async fn transition_booking(
        &self,
        id: Uuid,
        status: BookingStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let status = status.settlement_target()?;
        let mut bookings = self.bookings.write().await;
        match bookings.get_mut(&id) {
            Some(booking) if booking.status == BookingStatus::Pending => {
                booking.transition(status)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[derive(Default)]
pub struct MemoryPaymentRepository {
    payments: RwLock<HashMap<Uuid, Payment>>,
}

impl MemoryPaymentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn count(&self) -> usize {
        self.payments.read().await.len()
    }

    pub async fn all(&self) -> Vec<Payment> {
        self.payments.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn create_payment(
        &self,
        payment: &NewPayment,
    ) -> Result<Payment, Box<dyn std::error::Error + Send + Sync>> {
        let mut payments = self.payments.write().await;
        if payments.values().any(|p| p.session_id == payment.session_id) {
            return Err(format!("duplicate session id {}", payment.session_id).into());
        }
        let created = payment.clone().into_payment(Uuid::new_v4(), Utc::now());
        payments.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_payment_by_session(
        &self,
        session_id: &str,
    ) -> Result<Option<Payment>, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .find(|p| p.session_id == session_id)
            .cloned())
    }

    async fn transition_payment(
        &self,
        session_id: &str,
        status: PaymentStatus,
    ) -> Result<bool, Box<dyn std::error::Error + Send + Sync>> {
        let status = status.settlement_target()?;
        let mut payments = self.payments.write().await;
        match payments
            .values_mut()
            .find(|p| p.session_id == session_id && p.status == PaymentStatus::Pending)
        {
            Some(payment) if payment.status.can_transition_to(status) => {
                payment.status = status;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

/// Demo catalog, kept in sync with the seed migration
pub fn themed_rooms() -> Vec<Room> {
    let now = Utc::now();
    let room = |id: u128, name: &str, location: &str, price: f64, rating: f64, amenities: &[&str], image: &str, description: &str, max_guests: i32, room_type: RoomType| Room {
        id: Uuid::from_u128(id),
        name: name.to_string(),
        location: location.to_string(),
        price_per_night: price,
        rating,
        amenities: amenities.iter().map(|a| a.to_string()).collect(),
        max_guests,
        room_type,
        image_urls: vec![image.to_string()],
        description: description.to_string(),
        created_at: now,
        updated_at: now,
    };

    vec![
        room(1, "Jedi Suite", "Coruscant District, New York", 150.0, 4.8,
            &["Wi-Fi", "Pool", "Meditation Chamber", "City View"],
            "https://images.unsplash.com/photo-1566073771259-6a8506099945?w=800&h=600&fit=crop&crop=center",
            "A peaceful retreat for Jedi masters and padawans alike. Features a meditation chamber with panoramic city views.",
            2, RoomType::Suite),
        room(2, "Bounty Hunter Bunk", "Tatooine Outskirts, Los Angeles", 75.0, 4.2,
            &["Parking", "Weapon Storage", "Desert View"],
            "https://images.unsplash.com/photo-1631049307264-da0ec9d70304?w=800&h=600&fit=crop&crop=center",
            "Perfect for the traveling bounty hunter. Secure storage for equipment and vehicles included.",
            1, RoomType::Hotel),
        room(3, "Sith Sanctuary", "Mustafar Quarter, Chicago", 200.0, 4.9,
            &["Wi-Fi", "Gym", "Dark Chamber", "Lightning View"],
            "https://images.unsplash.com/photo-1571896349842-33c89424de2d?w=800&h=600&fit=crop&crop=center",
            "Embrace the dark side in this luxurious sanctuary. Features a private training chamber and dramatic city views.",
            2, RoomType::Suite),
        room(4, "Rebel Base", "Yavin Hub, Miami", 120.0, 4.5,
            &["Wi-Fi", "Breakfast", "Command Center", "Ocean View"],
            "https://images.unsplash.com/photo-1582719478250-c89cae4dc85b?w=800&h=600&fit=crop&crop=center",
            "Join the rebellion from this strategic oceanfront location. Includes command center and tactical amenities.",
            4, RoomType::Apartment),
        room(5, "Smuggler's Den", "Corellia Bay, San Francisco", 90.0, 4.3,
            &["Parking", "Pet-Friendly", "Hidden Compartments", "Bay View"],
            "https://images.unsplash.com/photo-1520637836862-4d197d17c97a?w=800&h=600&fit=crop&crop=center",
            "A discrete hideout with secret compartments and bay views. Perfect for those who need to stay under the radar.",
            3, RoomType::Apartment),
        room(6, "Imperial Command Suite", "Death Star District, Las Vegas", 300.0, 4.7,
            &["Wi-Fi", "Butler Service", "Hologram Theater", "Strip View"],
            "https://images.unsplash.com/photo-1564501049412-61c2a3083791?w=800&h=600&fit=crop&crop=center",
            "Rule the galaxy from this opulent Imperial suite. Features hologram theater and personal butler service.",
            2, RoomType::Suite),
    ]
}
