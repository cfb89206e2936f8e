//! Location cache
//!
//! A small key/value store with per-entry expiry. Two backends: an
//! in-process map and a Postgres table. Reads and writes are independent per
//! key; concurrent misses for the same key simply both fetch and the last
//! write wins.

use chrono::Utc;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use shared::{brazil::normalize, Coordinates};
use sqlx::PgPool;
use std::{
    collections::{BTreeMap, HashMap},
    sync::RwLock,
    time::{Duration, Instant},
};

use crate::error::{AppError, AppResult};

/// Key/value store with expiry
#[axum::async_trait]
pub trait GeoCache: Send + Sync {
    /// Fetch a live entry
    async fn get(&self, key: &str) -> AppResult<Option<Value>>;

    /// Store an entry that expires after `ttl`
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AppResult<()>;
}

/// Cache key for a reverse lookup, coordinates rounded to 4 decimals
pub fn reverse_geo_key(point: Coordinates) -> String {
    format!("reverse_geo_{:.4}_{:.4}", point.lat, point.lon)
}

/// Cache key for a forward lookup
pub fn geo_key(city: &str, state_code: &str, country: &str) -> String {
    format!(
        "geo_{}_{}_{}",
        normalize(city),
        state_code.to_uppercase(),
        normalize(country)
    )
}

/// Typed read. Cache failures and undecodable entries count as misses.
pub async fn get_json<T: DeserializeOwned>(cache: &dyn GeoCache, key: &str) -> Option<T> {
    match cache.get(key).await {
        Ok(Some(value)) => match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Discarding undecodable cache entry {}: {}", key, e);
                None
            }
        },
        Ok(None) => None,
        Err(e) => {
            tracing::warn!("Cache read failed for {}: {}", key, e);
            None
        }
    }
}

/// Typed write. Failures are logged and otherwise ignored.
pub async fn set_json<T: Serialize>(cache: &dyn GeoCache, key: &str, value: &T, ttl: Duration) {
    let value = match serde_json::to_value(value) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!("Cannot serialize cache entry {}: {}", key, e);
            return;
        }
    };

    if let Err(e) = cache.set(key, value, ttl).await {
        tracing::warn!("Cache write failed for {}: {}", key, e);
    }
}

// ============================================================================
// In-memory backend
// ============================================================================

/// Process-local cache holding at most `capacity` entries.
///
/// Expired entries are dropped on write. When the cache is still full, the
/// entry closest to expiry is evicted.
pub struct MemoryGeoCache {
    capacity: usize,
    inner: RwLock<MemoryEntries>,
}

#[derive(Default)]
struct MemoryEntries {
    values: HashMap<String, MemoryEntry>,
    /// Keys ordered by expiry, ties broken by insertion sequence
    expiries: BTreeMap<(Instant, u64), String>,
    next_seq: u64,
}

struct MemoryEntry {
    value: Value,
    expires_at: Instant,
    seq: u64,
}

impl MemoryEntries {
    fn len(&self) -> usize {
        self.values.len()
    }

    fn remove(&mut self, key: &str) {
        if let Some(entry) = self.values.remove(key) {
            self.expiries.remove(&(entry.expires_at, entry.seq));
        }
    }

    /// Remove the entry that expires first
    fn pop_soonest(&mut self) -> Option<Instant> {
        let ((expires_at, _), key) = self.expiries.pop_first()?;
        self.values.remove(&key);
        Some(expires_at)
    }

    fn purge_expired(&mut self, now: Instant) {
        while let Some((&(expires_at, _), _)) = self.expiries.first_key_value() {
            if expires_at > now {
                break;
            }
            self.pop_soonest();
        }
    }

    fn insert(&mut self, key: String, value: Value, expires_at: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.expiries.insert((expires_at, seq), key.clone());
        self.values.insert(
            key,
            MemoryEntry {
                value,
                expires_at,
                seq,
            },
        );
    }
}

impl MemoryGeoCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: RwLock::new(MemoryEntries::default()),
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.inner.read().map(|e| e.len()).unwrap_or(0)
    }

    fn poisoned() -> AppError {
        AppError::Internal("Memory cache lock poisoned".to_string())
    }
}

#[axum::async_trait]
impl GeoCache for MemoryGeoCache {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        let now = Instant::now();
        {
            let entries = self.inner.read().map_err(|_| Self::poisoned())?;
            match entries.values.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired
        let mut entries = self.inner.write().map_err(|_| Self::poisoned())?;
        if matches!(entries.values.get(key), Some(entry) if entry.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AppResult<()> {
        let now = Instant::now();
        let mut entries = self.inner.write().map_err(|_| Self::poisoned())?;

        entries.remove(key);
        entries.purge_expired(now);
        while entries.len() >= self.capacity {
            if entries.pop_soonest().is_none() {
                break;
            }
            tracing::debug!("Memory cache full, evicted one entry");
        }

        entries.insert(key.to_string(), value, now + ttl);
        Ok(())
    }
}

// ============================================================================
// Postgres backend
// ============================================================================

/// Cache rows in the `geocode_cache` table
#[derive(Clone)]
pub struct PgGeoCache {
    db: PgPool,
}

impl PgGeoCache {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[axum::async_trait]
impl GeoCache for PgGeoCache {
    async fn get(&self, key: &str) -> AppResult<Option<Value>> {
        let value = sqlx::query_scalar::<_, Value>(
            "SELECT value FROM geocode_cache WHERE key = $1 AND expires_at > NOW()",
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> AppResult<()> {
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AppError::Internal(format!("Invalid cache TTL: {}", e)))?;
        let expires_at = Utc::now() + ttl;

        sqlx::query(
            r#"
            INSERT INTO geocode_cache (key, value, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(&value)
        .bind(expires_at)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
