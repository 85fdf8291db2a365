//! Map surface lifecycle and marker synchronization.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, error, info};

use super::{MapOptions, MapRenderer, MarkerId, MarkerOverlay};
use crate::events::{GeocodeChannel, Subscription};
use crate::models::{LngLat, ViewMode};
use crate::supabase::PropertySource;

/// Result of one mode change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ModeChangeOutcome {
    /// Markers placed for the new mode
    Rendered {
        mode: ViewMode,
        markers: usize,
        /// Rows dropped for lacking a coordinate
        skipped: usize,
    },
    /// The query failed; the map is left without markers
    Failed { mode: ViewMode },
    /// A newer mode change was issued while this one was in flight
    Superseded { mode: ViewMode },
}

struct SurfaceState<R> {
    renderer: R,
    markers: Vec<MarkerId>,
}

impl<R: MapRenderer> SurfaceState<R> {
    fn clear_markers(&mut self) -> usize {
        let removed = self.markers.len();
        for id in self.markers.drain(..) {
            self.renderer.remove_marker(id);
        }
        removed
    }

    fn recenter(&mut self, center: LngLat, zoom: f64) {
        debug!("Recentering map on ({}, {})", center.lng, center.lat);
        self.renderer.fly_to(center, zoom);
    }
}

fn lock<R>(state: &Mutex<SurfaceState<R>>) -> MutexGuard<'_, SurfaceState<R>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Owns one mounted map, its recenter listener, and its markers.
///
/// Dropping the surface detaches the listener, removes every marker and tears
/// the map down.
pub struct MapSurface<R: MapRenderer> {
    state: Arc<Mutex<SurfaceState<R>>>,
    source: Arc<dyn PropertySource>,
    row_limit: usize,
    recenter_zoom: f64,
    /// Ticket of the most recently issued mode change
    latest: AtomicU64,
    subscription: Option<Subscription>,
}

impl<R: MapRenderer> MapSurface<R> {
    /// Create the map and start listening for recenter events.
    pub fn mount(
        mut renderer: R,
        options: &MapOptions,
        channel: &GeocodeChannel,
        source: Arc<dyn PropertySource>,
        row_limit: usize,
    ) -> Self {
        renderer.create_map(options);

        let state = Arc::new(Mutex::new(SurfaceState {
            renderer,
            markers: Vec::new(),
        }));

        let weak: Weak<Mutex<SurfaceState<R>>> = Arc::downgrade(&state);
        let zoom = options.recenter_zoom;
        let subscription = channel.subscribe(move |event| {
            if let Some(state) = weak.upgrade() {
                lock(&state).recenter((*event).into(), zoom);
            }
        });

        info!(
            "Map mounted at ({}, {}) zoom {}",
            options.center.lng, options.center.lat, options.zoom
        );

        Self {
            state,
            source,
            row_limit,
            recenter_zoom: options.recenter_zoom,
            latest: AtomicU64::new(0),
            subscription: Some(subscription),
        }
    }

    /// Replace the markers with the properties of `mode`.
    ///
    /// Existing markers are removed before the query is issued, so a failed
    /// query leaves the map empty. Only the newest call may place markers.
    pub async fn on_view_mode_change(&self, mode: ViewMode) -> ModeChangeOutcome {
        let ticket = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let removed = lock(&self.state).clear_markers();
        debug!("Mode change #{} to {}: removed {} markers", ticket, mode, removed);

        let records = match self.source.fetch_by_status(mode, self.row_limit).await {
            Ok(records) => records,
            Err(e) => {
                error!("Error fetching {} properties: {}", mode, e);
                return ModeChangeOutcome::Failed { mode };
            }
        };

        // Checked under the lock so a newer call cannot clear in between
        let mut state = lock(&self.state);
        if self.latest.load(Ordering::SeqCst) != ticket {
            debug!("Discarding {} rows from superseded mode change #{}", records.len(), ticket);
            return ModeChangeOutcome::Superseded { mode };
        }

        let mut skipped = 0;
        for record in &records {
            match MarkerOverlay::for_record(record, mode) {
                Some(overlay) => {
                    let id = state.renderer.add_marker(overlay);
                    state.markers.push(id);
                }
                None => skipped += 1,
            }
        }

        info!(
            "Placed {} {} markers ({} rows without coordinates)",
            state.markers.len(),
            mode,
            skipped
        );

        ModeChangeOutcome::Rendered {
            mode,
            markers: state.markers.len(),
            skipped,
        }
    }

    /// Fly to a coordinate at the recenter zoom. No range check is applied.
    pub fn on_geocode(&self, lng: f64, lat: f64) {
        lock(&self.state).recenter(LngLat::new(lng, lat), self.recenter_zoom);
    }

    /// Number of markers currently tracked
    pub fn marker_count(&self) -> usize {
        lock(&self.state).markers.len()
    }

    pub fn unmount(self) {}
}

impl<R: MapRenderer> Drop for MapSurface<R> {
    fn drop(&mut self) {
        // Detach first so no recenter lands on a removed map
        self.subscription.take();

        let mut state = lock(&self.state);
        state.clear_markers();
        state.renderer.remove_map();
        info!("Map unmounted");
    }
}
