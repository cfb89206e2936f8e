//! Location resolution service
//!
//! Turns a (city, state, country) triple into coordinates, trying in order:
//! the preset city table, the location cache, the geocoder, and finally the
//! state centroid. Also provides best-effort reverse lookups for points.

use shared::{
    brazil::{find_preset_city, find_state, resolve_state_code},
    Coordinates, LocationInfo, LocationSource, ResolvedLocation,
};
use std::{sync::Arc, time::Duration};

use crate::error::{AppError, AppResult};
use crate::external::GeocodingClient;
use crate::services::cache::{geo_key, get_json, reverse_geo_key, set_json, GeoCache};

/// Location service
#[derive(Clone)]
pub struct LocationService {
    geocoder: GeocodingClient,
    cache: Arc<dyn GeoCache>,
    ttl: Duration,
}

impl LocationService {
    /// Create a new LocationService instance
    pub fn new(geocoder: GeocodingClient, cache: Arc<dyn GeoCache>, ttl: Duration) -> Self {
        Self {
            geocoder,
            cache,
            ttl,
        }
    }

    /// Resolve a named place to coordinates
    pub async fn resolve(
        &self,
        city: &str,
        state: &str,
        country: &str,
    ) -> AppResult<ResolvedLocation> {
        let state_code = resolve_state_code(state);

        if let Some(preset) = find_preset_city(city, &state_code) {
            let state_name = find_state(&state_code).map(|s| s.name).unwrap_or(state);
            tracing::debug!("Preset hit for {}/{}", preset.name, state_code);
            return Ok(ResolvedLocation {
                lat: preset.coordinates.lat,
                lon: preset.coordinates.lon,
                display_name: format!("{}, {}, {}", preset.name, state_name, country),
                state_code,
                source: LocationSource::Preset,
            });
        }

        let key = geo_key(city, &state_code, country);
        if let Some(mut cached) = get_json::<ResolvedLocation>(self.cache.as_ref(), &key).await {
            tracing::debug!("Cache hit for {}", key);
            cached.source = LocationSource::Cache;
            return Ok(cached);
        }

        let query = format!("{}, {}, {}", city, state, country);
        match self.geocoder.search(&query).await {
            Ok(Some(hit)) => {
                let resolved = ResolvedLocation {
                    lat: hit.coordinates.lat,
                    lon: hit.coordinates.lon,
                    display_name: hit.display_name,
                    state_code,
                    source: LocationSource::Geocoder,
                };
                set_json(self.cache.as_ref(), &key, &resolved, self.ttl).await;
                return Ok(resolved);
            }
            Ok(None) => tracing::info!("Geocoder found no match for '{}'", query),
            Err(e) => tracing::warn!("Geocoder failed for '{}': {}", query, e),
        }

        Self::state_fallback(&state_code, country)
    }

    /// Best-effort reverse lookup. Any failure yields `None`.
    pub async fn reverse(&self, point: Coordinates) -> Option<LocationInfo> {
        let key = reverse_geo_key(point);
        if let Some(cached) = get_json::<LocationInfo>(self.cache.as_ref(), &key).await {
            return Some(cached);
        }

        match self.geocoder.reverse(point).await {
            Ok(Some(info)) => {
                set_json(self.cache.as_ref(), &key, &info, self.ttl).await;
                Some(info)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Reverse lookup failed for {:?}: {}", point, e);
                None
            }
        }
    }

    fn state_fallback(state_code: &str, country: &str) -> AppResult<ResolvedLocation> {
        let state = find_state(state_code).ok_or_else(|| {
            AppError::Internal(format!("No fallback coordinates for state {}", state_code))
        })?;

        tracing::info!("Falling back to centroid of {}", state.code);
        Ok(ResolvedLocation {
            lat: state.centroid.lat,
            lon: state.centroid.lon,
            display_name: format!("{}, {}", state.name, country),
            state_code: state.code.to_string(),
            source: LocationSource::StateFallback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeocodingConfig;
    use crate::services::cache::MemoryGeoCache;
    use crate::test_support::{spawn_stub, unreachable_url, StubCounter};
    use axum::{http::StatusCode, routing::get, Json, Router};

    const TTL: Duration = Duration::from_secs(3600);

    fn service_for(base_url: String, cache: Arc<dyn GeoCache>) -> LocationService {
        let geocoder = GeocodingClient::new(&GeocodingConfig {
            base_url,
            ..GeocodingConfig::default()
        })
        .unwrap();
        LocationService::new(geocoder, cache, TTL)
    }

    async fn counting_geocoder(counter: StubCounter) -> String {
        let search_hits = counter.clone();
        let reverse_hits = counter;
        let app = Router::new()
            .route(
                "/search",
                get(move || {
                    let hits = search_hits.clone();
                    async move {
                        hits.hit();
                        Json(serde_json::json!([
                            { "lat": "-29.3746", "lon": "-50.8764", "display_name": "Gramado, Rio Grande do Sul, Brasil" }
                        ]))
                    }
                }),
            )
            .route(
                "/reverse",
                get(move || {
                    let hits = reverse_hits.clone();
                    async move {
                        hits.hit();
                        Json(serde_json::json!({
                            "display_name": "Gramado, Rio Grande do Sul, Brasil",
                            "address": { "town": "Gramado", "state": "Rio Grande do Sul", "country": "Brasil" }
                        }))
                    }
                }),
            );
        spawn_stub(app).await
    }

    #[tokio::test]
    async fn test_preset_city_makes_no_outbound_call() {
        let counter = StubCounter::default();
        let base_url = counting_geocoder(counter.clone()).await;
        let service = service_for(base_url, Arc::new(MemoryGeoCache::new(16)));

        let resolved = service
            .resolve("Porto Alegre", "RS", "Brasil")
            .await
            .unwrap();

        assert_eq!(counter.count(), 0);
        assert_eq!(resolved.source, LocationSource::Preset);
        assert_eq!(resolved.state_code, "RS");
        assert!((resolved.lat - -30.0346).abs() < 0.01);
        assert!((resolved.lon - -51.2177).abs() < 0.01);
    }

    #[tokio::test]
    async fn test_preset_matches_full_state_name_and_accents() {
        let service = service_for(unreachable_url(), Arc::new(MemoryGeoCache::new(16)));

        let resolved = service
            .resolve("sao paulo", "São Paulo", "Brasil")
            .await
            .unwrap();

        assert_eq!(resolved.source, LocationSource::Preset);
        assert_eq!(resolved.state_code, "SP");
    }

    #[tokio::test]
    async fn test_geocoded_result_is_cached() {
        let counter = StubCounter::default();
        let base_url = counting_geocoder(counter.clone()).await;
        let service = service_for(base_url, Arc::new(MemoryGeoCache::new(16)));

        let first = service.resolve("Gramado", "RS", "Brasil").await.unwrap();
        let second = service.resolve("gramado", "rs", "brasil").await.unwrap();

        assert_eq!(counter.count(), 1);
        assert_eq!(first.source, LocationSource::Geocoder);
        assert_eq!(second.source, LocationSource::Cache);
        assert_eq!(first.coordinates(), second.coordinates());
    }

    #[tokio::test]
    async fn test_upstream_failure_falls_back_to_state_centroid() {
        let app = Router::new().route(
            "/search",
            get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "down") }),
        );
        let base_url = spawn_stub(app).await;
        let service = service_for(base_url, Arc::new(MemoryGeoCache::new(16)));

        let resolved = service.resolve("Gramado", "RS", "Brasil").await.unwrap();
        let rs = find_state("RS").unwrap();

        assert_eq!(resolved.source, LocationSource::StateFallback);
        assert_eq!(resolved.coordinates(), rs.centroid);
    }

    #[tokio::test]
    async fn test_empty_search_falls_back_and_is_not_cached() {
        let counter = StubCounter::default();
        let hits = counter.clone();
        let app = Router::new().route(
            "/search",
            get(move || {
                let hits = hits.clone();
                async move {
                    hits.hit();
                    Json(serde_json::json!([]))
                }
            }),
        );
        let base_url = spawn_stub(app).await;
        let service = service_for(base_url, Arc::new(MemoryGeoCache::new(16)));

        let first = service.resolve("Lugarnenhum", "MG", "Brasil").await.unwrap();
        service.resolve("Lugarnenhum", "MG", "Brasil").await.unwrap();

        assert_eq!(first.source, LocationSource::StateFallback);
        assert_eq!(first.state_code, "MG");
        assert_eq!(counter.count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_state_defaults_to_sao_paulo() {
        let service = service_for(unreachable_url(), Arc::new(MemoryGeoCache::new(16)));

        let resolved = service
            .resolve("Cidade Qualquer", "Atlantis", "Brasil")
            .await
            .unwrap();

        assert_eq!(resolved.source, LocationSource::StateFallback);
        assert_eq!(resolved.state_code, "SP");
    }

    #[tokio::test]
    async fn test_reverse_is_cached() {
        let counter = StubCounter::default();
        let base_url = counting_geocoder(counter.clone()).await;
        let service = service_for(base_url, Arc::new(MemoryGeoCache::new(16)));
        let point = Coordinates::new(-29.37461, -50.87642);

        let first = service.reverse(point).await.unwrap();
        let second = service
            .reverse(Coordinates::new(-29.374612, -50.876418))
            .await
            .unwrap();

        assert_eq!(counter.count(), 1);
        assert_eq!(first.city.as_deref(), Some("Gramado"));
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_reverse_failure_is_none() {
        let service = service_for(unreachable_url(), Arc::new(MemoryGeoCache::new(16)));

        let info = service.reverse(Coordinates::new(-15.79, -47.88)).await;
        assert!(info.is_none());
    }
}
