//! External API integrations

pub mod geocoding;
pub mod stac;

pub use geocoding::GeocodingClient;
pub use stac::StacClient;
