use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use std::fmt;
use tabled::Tabled;

/// One row of the combined trends CSV after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendRecord {
    pub date: NaiveDate,
    pub topic_name: String,
    pub region: String,
    pub region_name: String,
    pub interest_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionCentroid {
    pub region_code: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundaryRegion {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct AggregatedRegionValue {
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "Value", display_with = "display_value")]
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChoroplethRow {
    #[serde(rename = "RegionCode")]
    pub code: String,
    #[serde(rename = "RegionName")]
    pub name: String,
    #[serde(rename = "Value")]
    pub value: Option<f64>,
    #[serde(rename = "Tooltip")]
    pub tooltip: String,
}

/// A single week of the animated heat map. Points are `[lat, lon, weight]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub label: String,
    pub points: Vec<[f64; 3]>,
}

/// Frames laid out the way time-indexed heat-map layers expect them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatmapAnimation {
    pub index: Vec<String>,
    pub data: Vec<Vec<[f64; 3]>>,
}

impl From<Vec<Frame>> for HeatmapAnimation {
    fn from(frames: Vec<Frame>) -> Self {
        let (index, data) = frames.into_iter().map(|f| (f.label, f.points)).unzip();
        HeatmapAnimation { index, data }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyPoint {
    pub week_end: NaiveDate,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct RegionMarker {
    #[tabled(rename = "Region")]
    pub region: String,
    #[tabled(rename = "Lat", display_with = "display_coord")]
    pub lat: f64,
    #[tabled(rename = "Lon", display_with = "display_coord")]
    pub lon: f64,
    #[tabled(rename = "Latest (weekly)", display_with = "display_optional")]
    pub latest: Option<f64>,
    #[tabled(skip)]
    pub series: Vec<WeeklyPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
    InsufficientData,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TrendDirection::Increasing => "↑ Increasing",
            TrendDirection::Decreasing => "↓ Decreasing",
            TrendDirection::Stable => "→ Stable",
            TrendDirection::InsufficientData => "→ Insufficient data",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub average: f64,
    pub peak: f64,
    pub peak_date: NaiveDate,
    pub current: f64,
    pub trend: TrendDirection,
}

#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub topic: String,
    pub region: Option<String>,
    pub summary: SeriesSummary,
    pub top_regions: Vec<AggregatedRegionValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlueSkyPost {
    pub topic: String,
    pub created_at: DateTime<Utc>,
    pub date_only: NaiveDate,
    pub likes: u64,
    pub reposts: u64,
    pub replies: u64,
    pub author: String,
    pub text: String,
    pub month: String,
}

/// Which window a post selection came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostScope {
    Day,
    Month(String),
}

fn display_value(v: &f64) -> String {
    crate::util::format_number(*v, 2)
}

fn display_coord(v: &f64) -> String {
    format!("{:.4}", v)
}

fn display_optional(v: &Option<f64>) -> String {
    v.map(|v| crate::util::format_number(v, 1)).unwrap_or_default()
}
