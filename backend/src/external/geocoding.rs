//! Geocoding API client
//!
//! Integrates with a Nominatim-compatible endpoint for forward search
//! (`/search`) and reverse lookup (`/reverse`).

use reqwest::Client;
use serde::Deserialize;
use shared::{Coordinates, LocationInfo};
use std::time::Duration;

use crate::config::GeocodingConfig;
use crate::error::{AppError, AppResult};

/// Geocoding API client
#[derive(Clone)]
pub struct GeocodingClient {
    client: Client,
    base_url: String,
    country_code: String,
}

/// Top forward-search match
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub coordinates: Coordinates,
    pub display_name: String,
}

/// Nominatim search result item
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    display_name: String,
}

/// Nominatim reverse response
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

impl GeocodingClient {
    /// Create a new GeocodingClient
    pub fn new(config: &GeocodingConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            country_code: config.country_code.clone(),
        })
    }

    /// Free-text search restricted to the configured country, top result only
    pub async fn search(&self, query: &str) -> AppResult<Option<GeocodeHit>> {
        let url = format!("{}/search", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("countrycodes", self.country_code.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Geocoding request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "Geocoding API error: {} - {}",
                status, body
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse geocoding response: {}", e))
        })?;

        places.into_iter().next().map(Self::convert_place).transpose()
    }

    /// Reverse lookup of a point
    pub async fn reverse(&self, point: Coordinates) -> AppResult<Option<LocationInfo>> {
        let url = format!("{}/reverse", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("lat", point.lat.to_string()),
                ("lon", point.lon.to_string()),
                ("format", "json".to_string()),
                ("addressdetails", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("Reverse geocoding failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalService(format!(
                "Reverse geocoding API error: {}",
                status
            )));
        }

        let data: NominatimReverse = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse reverse response: {}", e))
        })?;

        Ok(Self::convert_reverse(data))
    }

    fn convert_place(place: NominatimPlace) -> AppResult<GeocodeHit> {
        let lat = place.lat.parse::<f64>();
        let lon = place.lon.parse::<f64>();

        match (lat, lon) {
            (Ok(lat), Ok(lon)) => Ok(GeocodeHit {
                coordinates: Coordinates::new(lat, lon),
                display_name: place.display_name,
            }),
            _ => Err(AppError::ExternalService(format!(
                "Geocoding returned invalid coordinates: {}, {}",
                place.lat, place.lon
            ))),
        }
    }

    fn convert_reverse(data: NominatimReverse) -> Option<LocationInfo> {
        if data.display_name.is_none() && data.address.is_none() {
            return None;
        }

        let address = data.address;
        Some(LocationInfo {
            city: address
                .as_ref()
                .and_then(|a| a.city.clone().or_else(|| a.town.clone()).or_else(|| a.village.clone())),
            state: address.as_ref().and_then(|a| a.state.clone()),
            country: address.as_ref().and_then(|a| a.country.clone()),
            display_name: data.display_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{spawn_stub, StubCounter};
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;

    fn client_for(base_url: String) -> GeocodingClient {
        GeocodingClient::new(&GeocodingConfig {
            base_url,
            ..GeocodingConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn test_reverse_prefers_city_then_town_then_village() {
        let info = GeocodingClient::convert_reverse(NominatimReverse {
            display_name: Some("Gramado, RS, Brasil".to_string()),
            address: Some(NominatimAddress {
                city: None,
                town: Some("Gramado".to_string()),
                village: Some("Linha Nova".to_string()),
                state: Some("Rio Grande do Sul".to_string()),
                country: Some("Brasil".to_string()),
            }),
        })
        .unwrap();

        assert_eq!(info.city.as_deref(), Some("Gramado"));
        assert_eq!(info.state.as_deref(), Some("Rio Grande do Sul"));
    }

    #[test]
    fn test_reverse_error_payload_is_none() {
        let info = GeocodingClient::convert_reverse(NominatimReverse {
            display_name: None,
            address: None,
        });
        assert!(info.is_none());
    }

    #[test]
    fn test_invalid_coordinates_rejected() {
        let result = GeocodingClient::convert_place(NominatimPlace {
            lat: "north".to_string(),
            lon: "-51.2".to_string(),
            display_name: "?".to_string(),
        });
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }

    #[tokio::test]
    async fn test_search_sends_country_restriction() {
        let counter = StubCounter::default();
        let hits = counter.clone();
        let app = Router::new().route(
            "/search",
            get(move |Query(params): Query<HashMap<String, String>>| {
                let hits = hits.clone();
                async move {
                    hits.hit();
                    assert_eq!(params.get("countrycodes").map(String::as_str), Some("br"));
                    assert_eq!(params.get("limit").map(String::as_str), Some("1"));
                    Json(serde_json::json!([
                        { "lat": "-29.3746", "lon": "-50.8764", "display_name": "Gramado, RS" }
                    ]))
                }
            }),
        );
        let base_url = spawn_stub(app).await;

        let hit = client_for(base_url)
            .search("Gramado, Rio Grande do Sul, Brasil")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(counter.count(), 1);
        assert_eq!(hit.coordinates, Coordinates::new(-29.3746, -50.8764));
        assert_eq!(hit.display_name, "Gramado, RS");
    }

    #[tokio::test]
    async fn test_search_no_results() {
        let app = Router::new().route("/search", get(|| async { Json(serde_json::json!([])) }));
        let base_url = spawn_stub(app).await;

        let hit = client_for(base_url).search("Nowhere").await.unwrap();
        assert!(hit.is_none());
    }

    #[tokio::test]
    async fn test_search_upstream_failure() {
        let app = Router::new().route(
            "/search",
            get(|| async { (axum::http::StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        );
        let base_url = spawn_stub(app).await;

        let result = client_for(base_url).search("Gramado").await;
        assert!(matches!(result, Err(AppError::ExternalService(_))));
    }
}
