//! Helpers for tests that need a live upstream

use axum::Router;
use sqlx::postgres::PgPoolOptions;
use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::config::{
    CacheConfig, CatalogConfig, Config, DatabaseConfig, GeocodingConfig, ServerConfig,
};
use crate::external::{GeocodingClient, StacClient};
use crate::services::MemoryGeoCache;
use crate::AppState;

/// Counts requests received by a stub endpoint
#[derive(Clone, Default)]
pub struct StubCounter(Arc<AtomicUsize>);

impl StubCounter {
    pub fn hit(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// Serve `app` on an ephemeral local port and return its base URL
pub async fn spawn_stub(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL nothing listens on; any request to it fails fast
pub fn unreachable_url() -> String {
    "http://127.0.0.1:9".to_string()
}

/// Application state wired to a stub upstream.
///
/// The geocoder is served under `{base_url}/geo` and the catalog under
/// `{base_url}/stac`. The database pool connects lazily, so routes that never
/// reach the database work without one.
pub fn test_state(base_url: &str) -> AppState {
    let config = Config {
        environment: "test".to_string(),
        server: ServerConfig::default(),
        database: DatabaseConfig {
            url: "postgres://localhost/bloom_test".to_string(),
            max_connections: 1,
            min_connections: 0,
        },
        geocoding: GeocodingConfig {
            base_url: format!("{}/geo", base_url),
            ..GeocodingConfig::default()
        },
        catalog: CatalogConfig {
            base_url: format!("{}/stac", base_url),
            ..CatalogConfig::default()
        },
        cache: CacheConfig {
            ttl_secs: 3600,
            ..CacheConfig::default()
        },
    };

    let db = PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(200))
        .connect_lazy(&config.database.url)
        .unwrap();

    AppState {
        db,
        cache: Arc::new(MemoryGeoCache::new(config.cache.memory_capacity)),
        geocoder: GeocodingClient::new(&config.geocoding).unwrap(),
        catalog: StacClient::new(&config.catalog),
        config: Arc::new(config),
    }
}
