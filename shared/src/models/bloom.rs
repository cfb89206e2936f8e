//! Bloom (vegetation index) models
//!
//! The index is a placeholder heuristic derived from scene cloud cover only,
//! not a spectral NDVI computed from red/near-infrared bands.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index reported for a perfectly clear scene
pub const NDVI_CLEAR_SKY: f64 = 0.8;

/// Percentage change above which a trend counts as rising (or below its
/// negation, falling)
pub const TREND_THRESHOLD_PERCENT: f64 = 5.0;

/// One scene's index value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BloomRecord {
    pub date: String,
    pub ndvi: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cloud_cover: Option<f64>,
}

/// Bloom intensity bands
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BloomStatus {
    None,
    Low,
    Medium,
    High,
    Peak,
}

/// Direction of change between the oldest and newest scene
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Trend::Rising => "rising",
            Trend::Falling => "falling",
            Trend::Stable => "stable",
        };
        f.write_str(s)
    }
}

/// Summary of a bloom history
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BloomResult {
    pub status: BloomStatus,
    pub indice: f64,
    pub variacao: String,
    pub tendencia: Trend,
    pub historico: Vec<BloomRecord>,
    pub insight: String,
}

/// Estimate the index from a scene's cloud cover percentage.
///
/// Linear penalty from [`NDVI_CLEAR_SKY`] at 0 % down to 0 at 100 %,
/// clamped to [0, 1].
pub fn estimate_ndvi(cloud_cover: f64) -> f64 {
    (NDVI_CLEAR_SKY * (1.0 - cloud_cover / 100.0)).clamp(0.0, 1.0)
}

/// Band an index value into a status
pub fn classify_status(indice: f64) -> BloomStatus {
    if indice < 0.2 {
        BloomStatus::None
    } else if indice < 0.4 {
        BloomStatus::Low
    } else if indice < 0.6 {
        BloomStatus::Medium
    } else if indice < 0.8 {
        BloomStatus::High
    } else {
        BloomStatus::Peak
    }
}

/// Percentage change from `first` to `last`; `None` when `first` is zero
pub fn percent_change(first: f64, last: f64) -> Option<f64> {
    if first == 0.0 {
        return None;
    }
    Some((last - first) / first * 100.0)
}

/// Signed, one-decimal rendering such as `+12.5%` or `-3.0%`.
/// An undefined change renders as `n/a`, never as an infinite percentage.
pub fn format_variation(change: Option<f64>) -> String {
    match change {
        Some(c) if c >= 0.0 => format!("+{:.1}%", c),
        Some(c) => format!("{:.1}%", c),
        None => "n/a".to_string(),
    }
}

/// Trend from a percentage change.
///
/// Without a percentage (oldest value was zero) the sign of the absolute
/// difference decides.
pub fn classify_trend(change: Option<f64>, first: f64, last: f64) -> Trend {
    match change {
        Some(c) if c > TREND_THRESHOLD_PERCENT => Trend::Rising,
        Some(c) if c < -TREND_THRESHOLD_PERCENT => Trend::Falling,
        Some(_) => Trend::Stable,
        None if last > first => Trend::Rising,
        None if last < first => Trend::Falling,
        None => Trend::Stable,
    }
}

/// Human-readable summary sentence
pub fn build_insight(indice: f64, trend: Trend, status: BloomStatus) -> String {
    let mut insight = format!("Índice atual: {:.2}. Tendência: {}.", indice, trend);
    match status {
        BloomStatus::Peak => insight.push_str(" Floração em pico detectada."),
        BloomStatus::High => insight.push_str(" Floração forte em andamento."),
        _ => {}
    }
    insight
}

/// Sort records by date and derive the summary.
///
/// Returns `None` for an empty history; callers decide how to report that.
pub fn summarize(mut historico: Vec<BloomRecord>) -> Option<BloomResult> {
    historico.sort_by(|a, b| a.date.cmp(&b.date));

    let first = historico.first()?.ndvi;
    let last = historico.last()?.ndvi;

    let change = percent_change(first, last);
    let tendencia = classify_trend(change, first, last);
    let status = classify_status(last);

    Some(BloomResult {
        status,
        indice: last,
        variacao: format_variation(change),
        tendencia,
        insight: build_insight(last, tendencia, status),
        historico,
    })
}
