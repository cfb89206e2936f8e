//! Domain models for the Bloom Monitor platform

mod bloom;
mod location;
mod user;

pub use bloom::*;
pub use location::*;
pub use user::*;
