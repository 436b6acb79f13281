pub mod app_config;
pub mod database;
pub mod room_repo;
pub mod booking_repo;
pub mod payment_repo;
pub mod memory;
pub mod stripe_client;

pub use database::DbClient;
pub use room_repo::StoreRoomRepository;
pub use booking_repo::StoreBookingRepository;
pub use payment_repo::StorePaymentRepository;
pub use memory::{MemoryRoomRepository, MemoryBookingRepository, MemoryPaymentRepository};
pub use stripe_client::StripeCheckoutClient;
