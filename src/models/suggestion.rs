//! Search Box suggest/retrieve payloads.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::LngLat;

/// Autocomplete candidate returned by the suggest endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub name: String,
    pub mapbox_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_formatted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_address: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SuggestResponse {
    #[serde(default)]
    pub suggestions: Option<Vec<Suggestion>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RetrieveResponse {
    #[serde(default)]
    pub features: Option<Vec<Feature>>,
}

/// GeoJSON feature returned by the retrieve endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    pub geometry: FeatureGeometry,
    #[serde(default)]
    pub properties: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureGeometry {
    #[serde(rename = "type", default)]
    pub geo_type: Option<String>,
    pub coordinates: Vec<f64>,
}

impl Feature {
    /// `[lng, lat]` of the feature; `None` when fewer than two ordinates are present
    pub fn coordinates(&self) -> Option<LngLat> {
        match self.geometry.coordinates.as_slice() {
            [lng, lat, ..] => Some(LngLat::new(*lng, *lat)),
            _ => None,
        }
    }
}

/// Groups a run of suggest/retrieve calls into one billable search session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SessionToken(Uuid);

impl SessionToken {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
