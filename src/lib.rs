//! Atlas - real-estate map front end
//!
//! Drives a map surface with property markers from a hosted table and
//! recenters it from geocoding search. The `atlas` binary serves the
//! composition over HTTP.

pub mod config;
pub mod error;
pub mod events;
pub mod map;
pub mod mapbox;
pub mod models;
pub mod search;
pub mod supabase;
pub mod view;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AtlasError, Result};
pub use events::{GeocodeChannel, GeocodeEvent};
pub use models::{LngLat, PropertyRecord, Suggestion, ViewMode};
pub use view::ViewComposition;
