//! Bloom scoring service
//!
//! Searches the imagery catalog for recent low-cloud scenes over a box and
//! derives a heuristic vegetation index per scene from its cloud cover.

use chrono::{Months, NaiveDate, Utc};
use shared::{estimate_ndvi, summarize, BloomRecord, BloomResult, BoundingBox};

use crate::error::{AppError, AppResult};
use crate::external::stac::StacItem;
use crate::external::StacClient;

/// Bloom scoring service
#[derive(Clone)]
pub struct BloomService {
    catalog: StacClient,
    lookback_months: u32,
}

impl BloomService {
    /// Create a new BloomService instance
    pub fn new(catalog: StacClient, lookback_months: u32) -> Self {
        Self {
            catalog,
            lookback_months,
        }
    }

    /// Score the vegetation over a bounding box
    pub async fn get_bloom(&self, bbox: &BoundingBox) -> AppResult<BloomResult> {
        let datetime = search_interval(Utc::now().date_naive(), self.lookback_months);
        tracing::debug!("Searching scenes over {:?} for {}", bbox, datetime);

        let items = self.catalog.search(bbox, &datetime).await?;
        if items.is_empty() {
            return Err(AppError::NotFound("Imagery for location".to_string()));
        }

        let records = records_from_items(&items);
        tracing::debug!("{} scenes, {} usable records", items.len(), records.len());

        summarize(records).ok_or_else(|| AppError::NotFound("Imagery for location".to_string()))
    }
}

/// `start/end` interval covering the `months` before `today`, as
/// `YYYY-MM-DD/YYYY-MM-DD`. Month subtraction clamps to the last valid day.
pub fn search_interval(today: NaiveDate, months: u32) -> String {
    let start = today
        .checked_sub_months(Months::new(months))
        .unwrap_or(NaiveDate::MIN);
    format!("{}/{}", start.format("%Y-%m-%d"), today.format("%Y-%m-%d"))
}

/// One record per dated scene. Scenes without any timestamp are skipped and
/// a missing cloud cover counts as clear sky.
pub fn records_from_items(items: &[StacItem]) -> Vec<BloomRecord> {
    items
        .iter()
        .filter_map(|item| {
            let Some(date) = item.acquired_at() else {
                tracing::debug!("Skipping undated scene {}", item.id);
                return None;
            };
            let cloud_cover = item.properties.cloud_cover.unwrap_or(0.0);
            Some(BloomRecord {
                date: date.to_string(),
                ndvi: estimate_ndvi(cloud_cover),
                cloud_cover: Some(cloud_cover),
            })
        })
        .collect()
}
