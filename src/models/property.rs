//! Property rows as stored in the hosted `properties` table.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

use crate::error::AtlasError;

/// Mutually exclusive filter selecting which properties are shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewMode {
    /// Active listings
    #[default]
    OnMarket,
    /// Off-market opportunities
    OffMarket,
}

impl ViewMode {
    pub fn all() -> &'static [ViewMode] {
        &[ViewMode::OnMarket, ViewMode::OffMarket]
    }

    /// Value stored in the `status` column
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::OnMarket => "on-market",
            ViewMode::OffMarket => "off-market",
        }
    }

    /// Label shown in the mode toggle
    pub fn label(&self) -> &'static str {
        match self {
            ViewMode::OnMarket => "Active Listings",
            ViewMode::OffMarket => "Deep Intelligence",
        }
    }

    /// Marker fill color: blue pins for listings, gold for off-market
    pub fn marker_color(&self) -> &'static str {
        match self {
            ViewMode::OnMarket => "#007AFF",
            ViewMode::OffMarket => "#C49A4A",
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ViewMode {
    type Err = AtlasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "on-market" => Ok(ViewMode::OnMarket),
            "off-market" => Ok(ViewMode::OffMarket),
            other => Err(AtlasError::InvalidViewMode(other.to_string())),
        }
    }
}

/// Longitude/latitude pair, in that order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LngLat {
    pub lng: f64,
    pub lat: f64,
}

impl LngLat {
    pub fn new(lng: f64, lat: f64) -> Self {
        Self { lng, lat }
    }
}

impl From<[f64; 2]> for LngLat {
    fn from([lng, lat]: [f64; 2]) -> Self {
        Self { lng, lat }
    }
}

/// One row of the properties table.
///
/// Only `id`, the coordinates and `status` are interpreted; every other
/// column is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    #[serde(default)]
    pub id: Value,

    #[serde(default)]
    pub longitude: Option<f64>,

    #[serde(default)]
    pub latitude: Option<f64>,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PropertyRecord {
    /// Position of the property, if both coordinates are present
    pub fn position(&self) -> Option<LngLat> {
        match (self.longitude, self.latitude) {
            (Some(lng), Some(lat)) => Some(LngLat { lng, lat }),
            _ => None,
        }
    }
}
