//! Configuration management for the Bloom Monitor backend
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (development.toml, production.toml)
//! 3. Environment variable overrides with BLOOM_ prefix

use config::{builder::DefaultState, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_MIN_CONNECTIONS: u32 = 2;

const DEFAULT_GEOCODING_URL: &str = "https://nominatim.openstreetmap.org";
const DEFAULT_USER_AGENT: &str = "BloomMonitor/1.0 (hackathon@example.com)";
const DEFAULT_GEOCODING_TIMEOUT_SECS: u64 = 5;
const DEFAULT_COUNTRY_CODE: &str = "br";

const DEFAULT_CATALOG_URL: &str = "https://planetarycomputer.microsoft.com/api/stac/v1";
const DEFAULT_COLLECTION: &str = "sentinel-2-l2a";
const DEFAULT_MAX_CLOUD_COVER: f64 = 30.0;
const DEFAULT_SEARCH_LIMIT: u32 = 10;
const DEFAULT_LOOKBACK_MONTHS: u32 = 6;

/// 30 days
const DEFAULT_CACHE_TTL_SECS: u64 = 2_592_000;
const DEFAULT_MEMORY_CAPACITY: usize = 10_000;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Geocoding API configuration
    pub geocoding: GeocodingConfig,

    /// Imagery catalog configuration
    pub catalog: CatalogConfig,

    /// Location cache configuration
    pub cache: CacheConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// Nominatim-compatible endpoint
    pub base_url: String,

    /// User-Agent sent with every request
    pub user_agent: String,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// ISO country code searches are restricted to
    pub country_code: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// STAC API root
    pub base_url: String,

    /// Collection searched for scenes
    pub collection: String,

    /// Scenes at or above this cloud cover percentage are excluded
    pub max_cloud_cover: f64,

    /// Maximum scenes per search
    pub limit: u32,

    /// Length of the search window ending today
    pub lookback_months: u32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// Where cached locations live
    pub backend: CacheBackend,

    /// Entry lifetime in seconds
    pub ttl_secs: u64,

    /// Maximum entries held by the in-memory backend
    pub memory_capacity: usize,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment =
            std::env::var("BLOOM_ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let config = with_defaults(&environment)?
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (BLOOM_ prefix)
            .add_source(
                Environment::with_prefix("BLOOM")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

/// Builder seeded with the default value of every optional setting
fn with_defaults(environment: &str) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    config::Config::builder()
        .set_default("environment", environment)?
        .set_default("server.port", DEFAULT_PORT as i64)?
        .set_default("server.host", DEFAULT_HOST)?
        .set_default("database.max_connections", DEFAULT_MAX_CONNECTIONS as i64)?
        .set_default("database.min_connections", DEFAULT_MIN_CONNECTIONS as i64)?
        .set_default("geocoding.base_url", DEFAULT_GEOCODING_URL)?
        .set_default("geocoding.user_agent", DEFAULT_USER_AGENT)?
        .set_default("geocoding.timeout_secs", DEFAULT_GEOCODING_TIMEOUT_SECS as i64)?
        .set_default("geocoding.country_code", DEFAULT_COUNTRY_CODE)?
        .set_default("catalog.base_url", DEFAULT_CATALOG_URL)?
        .set_default("catalog.collection", DEFAULT_COLLECTION)?
        .set_default("catalog.max_cloud_cover", DEFAULT_MAX_CLOUD_COVER)?
        .set_default("catalog.limit", DEFAULT_SEARCH_LIMIT as i64)?
        .set_default("catalog.lookback_months", DEFAULT_LOOKBACK_MONTHS as i64)?
        .set_default("cache.backend", "memory")?
        .set_default("cache.ttl_secs", DEFAULT_CACHE_TTL_SECS as i64)?
        .set_default("cache.memory_capacity", DEFAULT_MEMORY_CAPACITY as i64)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            host: DEFAULT_HOST.to_string(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEOCODING_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_GEOCODING_TIMEOUT_SECS,
            country_code: DEFAULT_COUNTRY_CODE.to_string(),
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            max_cloud_cover: DEFAULT_MAX_CLOUD_COVER,
            limit: DEFAULT_SEARCH_LIMIT,
            lookback_months: DEFAULT_LOOKBACK_MONTHS,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            ttl_secs: DEFAULT_CACHE_TTL_SECS,
            memory_capacity: DEFAULT_MEMORY_CAPACITY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults_match_struct_defaults() {
        let config: Config = with_defaults("test")
            .unwrap()
            .set_override("database.url", "postgres://localhost/bloom_test")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, ServerConfig::default().port);
        assert_eq!(config.server.host, ServerConfig::default().host);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.cache.ttl_secs, CacheConfig::default().ttl_secs);
        assert_eq!(config.geocoding.base_url, GeocodingConfig::default().base_url);
        assert_eq!(config.geocoding.user_agent, GeocodingConfig::default().user_agent);
        assert_eq!(config.geocoding.timeout_secs, GeocodingConfig::default().timeout_secs);
        assert_eq!(config.catalog.collection, CatalogConfig::default().collection);
        assert_eq!(config.catalog.limit, CatalogConfig::default().limit);
        assert_eq!(config.catalog.max_cloud_cover, CatalogConfig::default().max_cloud_cover);
        assert_eq!(config.catalog.lookback_months, CatalogConfig::default().lookback_months);
        assert_eq!(config.cache.memory_capacity, CacheConfig::default().memory_capacity);
    }
}
