//! Search bar state: autocomplete suggestions and selection handoff.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, error, info};

use crate::events::{GeocodeChannel, GeocodeEvent};
use crate::mapbox::GeocodeSource;
use crate::models::{SessionToken, Suggestion};

/// Inputs shorter than this, in UTF-16 code units, never reach the suggest
/// endpoint. Browser input fields measure text the same way.
pub const MIN_QUERY_LEN: usize = 3;

/// What the search box currently shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchState {
    pub query: String,
    pub suggestions: Vec<Suggestion>,
}

pub struct SearchBar {
    source: Arc<dyn GeocodeSource>,
    channel: GeocodeChannel,
    session: SessionToken,
    limit: usize,
    state: Mutex<SearchState>,
}

impl SearchBar {
    /// Mount a search bar with a fresh session token.
    pub fn mount(source: Arc<dyn GeocodeSource>, channel: GeocodeChannel, limit: usize) -> Self {
        let session = SessionToken::generate();
        debug!("Search session {} started", session);
        Self {
            source,
            channel,
            session,
            limit,
            state: Mutex::new(SearchState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, SearchState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn session_token(&self) -> SessionToken {
        self.session
    }

    pub fn snapshot(&self) -> SearchState {
        self.state().clone()
    }

    /// Handle a keystroke. Returns the resulting state.
    ///
    /// An error reply that still carries a JSON body empties the list; a
    /// transport failure or unreadable body leaves the previous suggestions
    /// in place.
    pub async fn on_input(&self, text: &str) -> SearchState {
        {
            let mut state = self.state();
            state.query = text.to_string();
            if text.encode_utf16().count() < MIN_QUERY_LEN {
                state.suggestions.clear();
                return state.clone();
            }
        }

        match self.source.suggest(text, &self.session, self.limit).await {
            Ok(suggestions) => {
                debug!("Showing {} suggestions for '{}'", suggestions.len(), text);
                self.state().suggestions = suggestions;
            }
            Err(e) => error!("Suggestion request for '{}' failed: {}", text, e),
        }

        self.snapshot()
    }

    /// Handle a click on a suggestion.
    ///
    /// Returns the event published on the channel, if any.
    pub async fn on_select(&self, suggestion: &Suggestion) -> Option<GeocodeEvent> {
        {
            let mut state = self.state();
            state.query = suggestion.name.clone();
            state.suggestions.clear();
        }

        let features = match self.source.retrieve(&suggestion.mapbox_id, &self.session).await {
            Ok(features) => features,
            Err(e) => {
                error!("Retrieve for '{}' failed: {}", suggestion.mapbox_id, e);
                return None;
            }
        };

        let Some(feature) = features.first() else {
            debug!("No feature returned for '{}'", suggestion.mapbox_id);
            return None;
        };
        let Some(point) = feature.coordinates() else {
            error!("Feature for '{}' has no coordinate pair", suggestion.mapbox_id);
            return None;
        };

        let event = GeocodeEvent::from(point);
        info!("Selected '{}' at ({}, {})", suggestion.name, event.lng, event.lat);
        self.channel.publish(event);
        Some(event)
    }
}
