//! HTTP handlers for bloom lookups

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use shared::{
    brazil::{State as BrazilState, STATES},
    is_bbox_in_brazil, is_point_in_brazil, point_bbox, validate_bounding_box, validate_point,
    BloomResult, BoundingBox, Coordinates, LocationInfo, ResolvedLocation,
};
use std::time::Duration;

use crate::error::{AppError, AppResult};
use crate::services::{BloomService, LocationService};
use crate::AppState;

const DEFAULT_COUNTRY: &str = "Brasil";

fn location_service(state: &AppState) -> LocationService {
    LocationService::new(
        state.geocoder.clone(),
        state.cache.clone(),
        Duration::from_secs(state.config.cache.ttl_secs),
    )
}

fn bloom_service(state: &AppState) -> BloomService {
    BloomService::new(state.catalog.clone(), state.config.catalog.lookback_months)
}

fn required_text(value: Option<String>, field: &str) -> AppResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::field(
            field,
            &format!("Parameter '{}' is required", field),
            &format!("Parâmetro '{}' é obrigatório", field),
        )),
    }
}

fn required_number(value: Option<f64>, field: &str) -> AppResult<f64> {
    value.ok_or_else(|| {
        AppError::field(
            field,
            &format!("Parameter '{}' is required", field),
            &format!("Parâmetro '{}' é obrigatório", field),
        )
    })
}

// ============================================================================
// By place name
// ============================================================================

/// Query parameters for a named place
#[derive(Debug, Deserialize)]
pub struct PlaceQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

/// Place as interpreted from the query
#[derive(Debug, Serialize)]
pub struct PlaceEcho {
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceBloomResponse {
    pub query: PlaceEcho,
    pub location: ResolvedLocation,
    pub bbox: BoundingBox,
    pub center: Coordinates,
    pub area_km2: f64,
    pub bloom: BloomResult,
}

/// Bloom data for a city
pub async fn get_bloom_by_location(
    State(state): State<AppState>,
    query: Result<Query<PlaceQuery>, QueryRejection>,
) -> AppResult<Json<PlaceBloomResponse>> {
    let Query(query) = query?;
    let city = required_text(query.city, "city")?;
    let region = required_text(query.state, "state")?;
    let country = query
        .country
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEFAULT_COUNTRY.to_string());

    let location = location_service(&state)
        .resolve(&city, &region, &country)
        .await?;

    let point = location.coordinates();
    if !is_point_in_brazil(&point) {
        return Err(AppError::OutsideSupportedRegion);
    }

    let bbox = point_bbox(point);
    let bloom = bloom_service(&state).get_bloom(&bbox).await?;

    Ok(Json(PlaceBloomResponse {
        query: PlaceEcho {
            city,
            state: region,
            country,
        },
        location,
        center: bbox.center(),
        area_km2: bbox.area_km2(),
        bbox,
        bloom,
    }))
}

// ============================================================================
// By bounding box
// ============================================================================

/// Query parameters for an explicit box
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaQuery {
    pub min_lat: Option<f64>,
    pub min_lon: Option<f64>,
    pub max_lat: Option<f64>,
    pub max_lon: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AreaBloomResponse {
    pub bbox: BoundingBox,
    pub center: Coordinates,
    pub area_km2: f64,
    pub location: Option<LocationInfo>,
    pub bloom: BloomResult,
}

/// Bloom data for a bounding box
pub async fn get_bloom_by_area(
    State(state): State<AppState>,
    query: Result<Query<AreaQuery>, QueryRejection>,
) -> AppResult<Json<AreaBloomResponse>> {
    let Query(query) = query?;
    let bbox = BoundingBox::new(
        required_number(query.min_lat, "minLat")?,
        required_number(query.min_lon, "minLon")?,
        required_number(query.max_lat, "maxLat")?,
        required_number(query.max_lon, "maxLon")?,
    );

    validate_bounding_box(&bbox)
        .map_err(|msg| AppError::field("bbox", msg, "Área geográfica inválida"))?;
    if !is_bbox_in_brazil(&bbox) {
        return Err(AppError::OutsideSupportedRegion);
    }

    let center = bbox.center();
    let location = location_service(&state).reverse(center).await;
    let bloom = bloom_service(&state).get_bloom(&bbox).await?;

    Ok(Json(AreaBloomResponse {
        bbox,
        center,
        area_km2: bbox.area_km2(),
        location,
        bloom,
    }))
}

// ============================================================================
// By point
// ============================================================================

/// Query parameters for a single point
#[derive(Debug, Deserialize)]
pub struct PointQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointBloomResponse {
    pub point: Coordinates,
    pub bbox: BoundingBox,
    pub location: Option<LocationInfo>,
    pub bloom: BloomResult,
}

/// Bloom data around a point
pub async fn get_bloom_by_point(
    State(state): State<AppState>,
    query: Result<Query<PointQuery>, QueryRejection>,
) -> AppResult<Json<PointBloomResponse>> {
    let Query(query) = query?;
    let point = Coordinates::new(
        required_number(query.lat, "lat")?,
        required_number(query.lon, "lon")?,
    );

    validate_point(&point)
        .map_err(|msg| AppError::field("point", msg, "Coordenadas inválidas"))?;
    if !is_point_in_brazil(&point) {
        return Err(AppError::OutsideSupportedRegion);
    }

    let bbox = point_bbox(point);
    let location = location_service(&state).reverse(point).await;
    let bloom = bloom_service(&state).get_bloom(&bbox).await?;

    Ok(Json(PointBloomResponse {
        point,
        bbox,
        location,
        bloom,
    }))
}

// ============================================================================
// States
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StatesResponse {
    pub states: &'static [BrazilState],
}

/// Brazilian federative units
pub async fn list_states() -> Json<StatesResponse> {
    Json(StatesResponse { states: STATES })
}
