//! HTTP handlers for the Bloom Monitor API

pub mod bloom;
pub mod health;
pub mod user;

pub use bloom::{get_bloom_by_area, get_bloom_by_location, get_bloom_by_point, list_states};
pub use health::health_check;
pub use user::{create_user, delete_user, get_user, list_users, update_user};
