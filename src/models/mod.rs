//! Data models shared by the clients and the map surface.

pub mod property;
pub mod suggestion;

pub use property::{LngLat, PropertyRecord, ViewMode};
pub use suggestion::{Feature, FeatureGeometry, SessionToken, Suggestion};
