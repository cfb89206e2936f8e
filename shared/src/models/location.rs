//! Location descriptors produced by the resolver

use serde::{Deserialize, Serialize};

use crate::types::Coordinates;

/// Reverse-geocoded place description
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocationInfo {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub display_name: Option<String>,
}

/// Which step of the resolution chain produced a location
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationSource {
    Preset,
    Cache,
    Geocoder,
    StateFallback,
}

/// Coordinates resolved for a named place
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub lat: f64,
    pub lon: f64,
    pub display_name: String,
    pub state_code: String,
    pub source: LocationSource,
}

impl ResolvedLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lon)
    }
}
