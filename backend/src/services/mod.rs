//! Business logic services for the Bloom Monitor backend

pub mod bloom;
pub mod cache;
pub mod location;
pub mod user;

pub use bloom::BloomService;
pub use cache::{GeoCache, MemoryGeoCache, PgGeoCache};
pub use location::LocationService;
pub use user::UserService;
