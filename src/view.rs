//! Top-level page: mode toggle, search bar and map sharing one event channel.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::{info, warn};

use crate::config::Config;
use crate::events::GeocodeChannel;
use crate::map::{MapRenderer, MapSurface, ModeChangeOutcome};
use crate::mapbox::{GeocodeSource, SearchBoxClient};
use crate::models::ViewMode;
use crate::search::SearchBar;
use crate::supabase::{PropertySource, SupabaseClient};

pub struct ViewComposition<R: MapRenderer> {
    channel: GeocodeChannel,
    search: SearchBar,
    map: MapSurface<R>,
    mode: Mutex<ViewMode>,
}

impl<R: MapRenderer> ViewComposition<R> {
    /// Mount against the real remote services described by `config`.
    pub async fn mount(config: &Config, renderer: R) -> Self {
        for name in config.missing_secrets() {
            warn!("{} is not set; the features that need it will not work", name);
        }

        let properties = Arc::new(SupabaseClient::new(&config.supabase));
        let geocoder = Arc::new(SearchBoxClient::new(&config.mapbox));
        Self::with_sources(config, renderer, properties, geocoder).await
    }

    /// Mount with explicit data sources and load the default mode.
    pub async fn with_sources(
        config: &Config,
        renderer: R,
        properties: Arc<dyn PropertySource>,
        geocoder: Arc<dyn GeocodeSource>,
    ) -> Self {
        let channel = GeocodeChannel::new();
        let map = MapSurface::mount(
            renderer,
            &config.map,
            &channel,
            properties,
            config.supabase.row_limit,
        );
        let search = SearchBar::mount(geocoder, channel.clone(), config.mapbox.suggestion_limit);

        let mode = ViewMode::default();
        let view = Self {
            channel,
            search,
            map,
            mode: Mutex::new(mode),
        };
        view.map.on_view_mode_change(mode).await;
        view
    }

    pub fn view_mode(&self) -> ViewMode {
        *self.mode.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Switch the mode toggle. Returns `None` when the mode is unchanged.
    pub async fn set_view_mode(&self, mode: ViewMode) -> Option<ModeChangeOutcome> {
        {
            let mut current = self.mode.lock().unwrap_or_else(PoisonError::into_inner);
            if *current == mode {
                return None;
            }
            *current = mode;
        }

        info!("View mode set to {} ({})", mode, mode.label());
        Some(self.map.on_view_mode_change(mode).await)
    }

    /// Re-run the query for the current mode
    pub async fn refresh(&self) -> ModeChangeOutcome {
        self.map.on_view_mode_change(self.view_mode()).await
    }

    pub fn search(&self) -> &SearchBar {
        &self.search
    }

    pub fn map(&self) -> &MapSurface<R> {
        &self.map
    }

    pub fn channel(&self) -> &GeocodeChannel {
        &self.channel
    }

    pub fn unmount(self) {
        info!("Unmounting view");
    }
}
