//! In-memory rendering backend.
//!
//! Records what a map widget would display so it can be served to a page or
//! inspected in tests.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

use super::{MapOptions, MapRenderer, MarkerId, MarkerOverlay};
use crate::models::LngLat;

/// Snapshot of the rendered map
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    pub mounted: bool,
    pub style: String,
    pub center: LngLat,
    pub zoom: f64,
    pub markers: BTreeMap<MarkerId, MarkerOverlay>,
    /// Bumped on every change
    pub revision: u64,
    pub updated_at: DateTime<Utc>,
}

impl Default for Scene {
    fn default() -> Self {
        let options = MapOptions::default();
        Self {
            mounted: false,
            style: options.style,
            center: options.center,
            zoom: options.zoom,
            markers: BTreeMap::new(),
            revision: 0,
            updated_at: Utc::now(),
        }
    }
}

impl Scene {
    fn touch(&mut self) {
        self.revision += 1;
        self.updated_at = Utc::now();
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }
}

/// Read side of a [`SceneRenderer`], cheap to clone
#[derive(Clone, Default)]
pub struct SceneHandle {
    scene: Arc<Mutex<Scene>>,
}

impl SceneHandle {
    pub fn snapshot(&self) -> Scene {
        self.scene.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[derive(Default)]
pub struct SceneRenderer {
    handle: SceneHandle,
    next_id: MarkerId,
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&self) -> SceneHandle {
        self.handle.clone()
    }

    fn update<T>(&self, f: impl FnOnce(&mut Scene) -> T) -> T {
        let mut scene = self.handle.scene.lock().unwrap_or_else(PoisonError::into_inner);
        let out = f(&mut scene);
        scene.touch();
        out
    }
}

impl MapRenderer for SceneRenderer {
    fn create_map(&mut self, options: &MapOptions) {
        debug!("Creating map at ({}, {}) zoom {}", options.center.lng, options.center.lat, options.zoom);
        self.update(|scene| {
            scene.mounted = true;
            scene.style = options.style.clone();
            scene.center = options.center;
            scene.zoom = options.zoom;
            scene.markers.clear();
        });
    }

    fn add_marker(&mut self, marker: MarkerOverlay) -> MarkerId {
        self.next_id += 1;
        let id = self.next_id;
        self.update(|scene| {
            if !scene.mounted {
                warn!("Marker {} added to a map that is not mounted", id);
            }
            scene.markers.insert(id, marker);
        });
        id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        self.update(|scene| {
            scene.markers.remove(&id);
        });
    }

    fn fly_to(&mut self, center: LngLat, zoom: f64) {
        self.update(|scene| {
            scene.center = center;
            scene.zoom = zoom;
        });
    }

    fn remove_map(&mut self) {
        self.update(|scene| {
            scene.mounted = false;
            scene.markers.clear();
        });
    }
}
