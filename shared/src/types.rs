//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// Approximate kilometres per degree of latitude
pub const KM_PER_DEGREE: f64 = 111.0;

/// GPS coordinates in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Rectangular region in decimal degrees
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    pub fn new(min_lat: f64, min_lon: f64, max_lat: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    /// Square box of `delta` degrees on each side of a point
    pub fn around(point: Coordinates, delta: f64) -> Self {
        Self {
            min_lat: point.lat - delta,
            min_lon: point.lon - delta,
            max_lat: point.lat + delta,
            max_lon: point.lon + delta,
        }
    }

    /// Arithmetic midpoint of each axis
    pub fn center(&self) -> Coordinates {
        Coordinates {
            lat: (self.min_lat + self.max_lat) / 2.0,
            lon: (self.min_lon + self.max_lon) / 2.0,
        }
    }

    /// Approximate area in km² using an equirectangular projection.
    ///
    /// Longitude spans are scaled by the cosine of the mean latitude. Only
    /// meaningful for small boxes.
    pub fn area_km2(&self) -> f64 {
        let lat_diff = (self.max_lat - self.min_lat) * KM_PER_DEGREE;
        let avg_lat = (self.min_lat + self.max_lat) / 2.0;
        let lon_diff = (self.max_lon - self.min_lon) * KM_PER_DEGREE * avg_lat.to_radians().cos();
        (lat_diff * lon_diff).abs()
    }

    /// STAC ordering: `[west, south, east, north]`
    pub fn to_stac_bbox(&self) -> [f64; 4] {
        [self.min_lon, self.min_lat, self.max_lon, self.max_lat]
    }
}

/// Sort direction for list endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub const MAX_LIMIT: u32 = 100;

    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * self.limit as i64
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub limit: u32,
    pub total_count: u64,
    pub total_pages: u32,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination, total_count: u64) -> Self {
        let limit = pagination.limit.max(1) as u64;
        Self {
            data,
            page: pagination.page,
            limit: pagination.limit,
            total_count,
            total_pages: total_count.div_ceil(limit) as u32,
        }
    }
}
