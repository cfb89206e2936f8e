//! Validation utilities for Bloom Monitor
//!
//! Includes Brazil-specific coordinate checks. Brazil is approximated by its
//! bounding rectangle, so points near the border can be misclassified.

use crate::types::{BoundingBox, Coordinates, Pagination};

/// Southernmost latitude accepted as Brazilian territory
pub const BRAZIL_MIN_LAT: f64 = -33.75;
/// Northernmost latitude accepted as Brazilian territory
pub const BRAZIL_MAX_LAT: f64 = 5.27;
/// Westernmost longitude accepted as Brazilian territory
pub const BRAZIL_MIN_LON: f64 = -73.98;
/// Easternmost longitude accepted as Brazilian territory
pub const BRAZIL_MAX_LON: f64 = -34.79;

/// Half-width in degrees of the box built around a single point
pub const POINT_BOX_DELTA: f64 = 0.1;

// ============================================================================
// Coordinate Validations
// ============================================================================

/// Check that a latitude lies in [-90, 90]
pub fn is_valid_latitude(lat: f64) -> bool {
    (-90.0..=90.0).contains(&lat)
}

/// Check that a longitude lies in [-180, 180]
pub fn is_valid_longitude(lon: f64) -> bool {
    (-180.0..=180.0).contains(&lon)
}

/// Validate a bounding box: strict min < max ordering and world ranges
pub fn validate_bounding_box(bbox: &BoundingBox) -> Result<(), &'static str> {
    if bbox.min_lat >= bbox.max_lat || bbox.min_lon >= bbox.max_lon {
        return Err("minLat must be < maxLat and minLon must be < maxLon");
    }
    if !is_valid_latitude(bbox.min_lat)
        || !is_valid_latitude(bbox.max_lat)
        || !is_valid_longitude(bbox.min_lon)
        || !is_valid_longitude(bbox.max_lon)
    {
        return Err("Coordinates out of range: lat [-90, 90], lon [-180, 180]");
    }
    Ok(())
}

/// Validate a single point against world ranges
pub fn validate_point(point: &Coordinates) -> Result<(), &'static str> {
    if !is_valid_latitude(point.lat) {
        return Err("Latitude must be between -90 and 90");
    }
    if !is_valid_longitude(point.lon) {
        return Err("Longitude must be between -180 and 180");
    }
    Ok(())
}

// ============================================================================
// Brazil-Specific Validations
// ============================================================================

/// Check that a point falls within Brazil's bounding rectangle
pub fn is_point_in_brazil(point: &Coordinates) -> bool {
    (BRAZIL_MIN_LAT..=BRAZIL_MAX_LAT).contains(&point.lat)
        && (BRAZIL_MIN_LON..=BRAZIL_MAX_LON).contains(&point.lon)
}

/// Check that a whole box falls within Brazil's bounding rectangle
pub fn is_bbox_in_brazil(bbox: &BoundingBox) -> bool {
    is_point_in_brazil(&Coordinates::new(bbox.min_lat, bbox.min_lon))
        && is_point_in_brazil(&Coordinates::new(bbox.max_lat, bbox.max_lon))
}

/// Build the fixed-size box used for point lookups
pub fn point_bbox(point: Coordinates) -> BoundingBox {
    BoundingBox::around(point, POINT_BOX_DELTA)
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate list pagination (page >= 1, 1 <= limit <= MAX_LIMIT)
pub fn validate_pagination(pagination: &Pagination) -> Result<(), &'static str> {
    if pagination.page < 1 {
        return Err("page must be at least 1");
    }
    if pagination.limit < 1 || pagination.limit > Pagination::MAX_LIMIT {
        return Err("limit must be between 1 and 100");
    }
    Ok(())
}
