//! STAC catalog client for satellite scene search
//!
//! Only the metadata needed for scoring is decoded: scene date and
//! `eo:cloud_cover`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::BoundingBox;

use crate::config::CatalogConfig;
use crate::error::{AppError, AppResult};

/// STAC search client
#[derive(Clone)]
pub struct StacClient {
    client: Client,
    base_url: String,
    collection: String,
    max_cloud_cover: f64,
    limit: u32,
}

/// Body for `POST /search`
#[derive(Debug, Serialize)]
pub struct SearchRequest {
    pub collections: Vec<String>,
    pub bbox: [f64; 4],
    pub datetime: String,
    pub query: serde_json::Value,
    pub limit: u32,
}

/// Item collection returned by `/search`
#[derive(Debug, Deserialize)]
pub struct ItemCollection {
    #[serde(default)]
    pub features: Vec<StacItem>,
}

/// A single scene
#[derive(Debug, Clone, Deserialize)]
pub struct StacItem {
    #[serde(default)]
    pub id: String,
    pub properties: StacItemProperties,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StacItemProperties {
    pub datetime: Option<String>,
    pub start_datetime: Option<String>,
    #[serde(rename = "eo:cloud_cover")]
    pub cloud_cover: Option<f64>,
}

impl StacItem {
    /// Acquisition timestamp, falling back to the range start for items
    /// published with a null `datetime`
    pub fn acquired_at(&self) -> Option<&str> {
        self.properties
            .datetime
            .as_deref()
            .or(self.properties.start_datetime.as_deref())
    }
}

impl StacClient {
    /// Create a new StacClient
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            collection: config.collection.clone(),
            max_cloud_cover: config.max_cloud_cover,
            limit: config.limit,
        }
    }

    /// Build the search body for a box and a `start/end` datetime interval
    pub fn build_request(&self, bbox: &BoundingBox, datetime: &str) -> SearchRequest {
        SearchRequest {
            collections: vec![self.collection.clone()],
            bbox: bbox.to_stac_bbox(),
            datetime: datetime.to_string(),
            query: serde_json::json!({
                "eo:cloud_cover": { "lt": self.max_cloud_cover }
            }),
            limit: self.limit,
        }
    }

    /// Search scenes intersecting the box within the interval
    pub async fn search(&self, bbox: &BoundingBox, datetime: &str) -> AppResult<Vec<StacItem>> {
        let url = format!("{}/search", self.base_url);
        let request = self.build_request(bbox, datetime);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::ExternalService(format!("STAC search request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalService(format!(
                "STAC search error: {} - {}",
                status, body
            )));
        }

        let data: ItemCollection = response.json().await.map_err(|e| {
            AppError::ExternalService(format!("Failed to parse STAC response: {}", e))
        })?;

        Ok(data.features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let client = StacClient::new(&CatalogConfig::default());
        let bbox = BoundingBox::new(-30.134, -51.317, -29.934, -51.117);
        let request = client.build_request(&bbox, "2024-01-01/2024-07-01");

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["collections"], serde_json::json!(["sentinel-2-l2a"]));
        assert_eq!(body["bbox"][0], -51.317);
        assert_eq!(body["bbox"][1], -30.134);
        assert_eq!(body["datetime"], "2024-01-01/2024-07-01");
        assert_eq!(body["query"]["eo:cloud_cover"]["lt"], 30.0);
        assert_eq!(body["limit"], 10);
    }

    #[test]
    fn test_item_parsing() {
        let json = serde_json::json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "id": "S2A_1",
                    "properties": { "datetime": "2024-05-02T13:21:11Z", "eo:cloud_cover": 12.5 }
                },
                {
                    "id": "S2B_2",
                    "properties": { "datetime": null, "start_datetime": "2024-04-01T00:00:00Z" }
                }
            ]
        });

        let collection: ItemCollection = serde_json::from_value(json).unwrap();
        assert_eq!(collection.features.len(), 2);
        assert_eq!(collection.features[0].properties.cloud_cover, Some(12.5));
        assert_eq!(
            collection.features[1].acquired_at(),
            Some("2024-04-01T00:00:00Z")
        );
        assert_eq!(collection.features[1].properties.cloud_cover, None);
    }
}
