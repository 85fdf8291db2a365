//! Map surface: map lifecycle, recentering and marker synchronization.

pub mod marker;
pub mod scene;
mod surface;

pub use marker::{MarkerElement, MarkerId, MarkerOverlay};
pub use scene::{Scene, SceneHandle, SceneRenderer};
pub use surface::{MapSurface, ModeChangeOutcome};

use serde::{Deserialize, Serialize};

use crate::models::LngLat;

pub const DEFAULT_STYLE: &str = "mapbox://styles/mapbox/dark-v11";
pub const DEFAULT_ZOOM: f64 = 11.0;
pub const RECENTER_ZOOM: f64 = 14.0;

/// Washington DC
pub const DEFAULT_CENTER: LngLat = LngLat {
    lng: -77.04,
    lat: 38.907,
};

/// Construction parameters for the map instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapOptions {
    pub style: String,
    pub center: LngLat,
    pub zoom: f64,
    /// Zoom used when flying to a searched location
    pub recenter_zoom: f64,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            style: DEFAULT_STYLE.to_string(),
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            recenter_zoom: RECENTER_ZOOM,
        }
    }
}

/// Rendering backend driven by the surface.
///
/// Implementations own the actual map instance; the surface only tells them
/// what to show.
pub trait MapRenderer: Send + 'static {
    fn create_map(&mut self, options: &MapOptions);

    fn add_marker(&mut self, marker: MarkerOverlay) -> MarkerId;

    fn remove_marker(&mut self, id: MarkerId);

    fn fly_to(&mut self, center: LngLat, zoom: f64);

    /// Tear the map down. No other call is made afterwards.
    fn remove_map(&mut self);
}
