//! Marker overlays bound to rendered properties.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{LngLat, PropertyRecord, ViewMode};

/// Identifier handed out by the renderer for a placed marker
pub type MarkerId = u64;

pub const MARKER_CLASS: &str = "marker";

/// DOM-like element backing a marker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerElement {
    pub class_name: String,
    pub background_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkerOverlay {
    pub property_id: Value,
    pub position: LngLat,
    pub element: MarkerElement,
}

impl MarkerOverlay {
    /// Build the overlay for a record, or `None` if it lacks a coordinate
    pub fn for_record(record: &PropertyRecord, mode: ViewMode) -> Option<Self> {
        let position = record.position()?;
        Some(Self {
            property_id: record.id.clone(),
            position,
            element: MarkerElement {
                class_name: MARKER_CLASS.to_string(),
                background_color: mode.marker_color().to_string(),
            },
        })
    }

    pub fn color(&self) -> &str {
        &self.element.background_color
    }
}
