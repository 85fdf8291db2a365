//! Geocoding suggestion service.

mod searchbox;

pub use searchbox::SearchBoxClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Feature, SessionToken, Suggestion};

/// Two-step suggestion lookup: free text to candidates, candidate to features
#[async_trait]
pub trait GeocodeSource: Send + Sync {
    async fn suggest(&self, query: &str, session: &SessionToken, limit: usize) -> Result<Vec<Suggestion>>;

    async fn retrieve(&self, mapbox_id: &str, session: &SessionToken) -> Result<Vec<Feature>>;
}
