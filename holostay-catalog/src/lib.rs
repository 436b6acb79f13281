pub mod room;
pub mod filters;
pub mod pricing;

pub use room::{Room, RoomType, RoomSummary, RoomError};
pub use filters::{RoomFilters, sort_by_rating, collect_amenities};
pub use pricing::{nights_between, quote_total};
