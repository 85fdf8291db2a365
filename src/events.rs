//! Geocode event channel.
//!
//! Carries the single `atlas-geocode` signal from the search bar to the map.
//! The channel is an explicit object owned by the view composition and handed
//! to both sides. Delivery is synchronous, in registration order, and nothing
//! is queued: an event published with no listener attached is dropped.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tracing::debug;

use crate::models::LngLat;

/// Name of the only event this channel carries
pub const GEOCODE_EVENT: &str = "atlas-geocode";

/// Coordinate broadcast after a successful retrieval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeocodeEvent {
    pub lng: f64,
    pub lat: f64,
}

impl From<LngLat> for GeocodeEvent {
    fn from(p: LngLat) -> Self {
        Self { lng: p.lng, lat: p.lat }
    }
}

impl From<GeocodeEvent> for LngLat {
    fn from(e: GeocodeEvent) -> Self {
        LngLat::new(e.lng, e.lat)
    }
}

type Listener = Arc<dyn Fn(&GeocodeEvent) + Send + Sync>;

#[derive(Default)]
struct ChannelInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

impl ChannelInner {
    fn remove(&self, id: u64) {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        listeners.retain(|(lid, _)| *lid != id);
    }
}

/// Shared broadcast point; clones refer to the same channel.
#[derive(Clone, Default)]
pub struct GeocodeChannel {
    inner: Arc<ChannelInner>,
}

impl GeocodeChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays attached until the returned guard drops.
    #[must_use = "dropping the subscription detaches the listener immediately"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&GeocodeEvent) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));

        debug!("Listener {} attached to {}", id, GEOCODE_EVENT);
        Subscription {
            channel: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Deliver an event to every attached listener. Returns how many received it.
    pub fn publish(&self, event: GeocodeEvent) -> usize {
        // Snapshot so listeners may subscribe or detach while being called
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| Arc::clone(l))
            .collect();

        for listener in &listeners {
            listener(&event);
        }

        debug!(
            "Published {} ({}, {}) to {} listeners",
            GEOCODE_EVENT,
            event.lng,
            event.lat,
            listeners.len()
        );
        listeners.len()
    }

    pub fn listener_count(&self) -> usize {
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Detaches its listener when dropped.
pub struct Subscription {
    channel: Weak<ChannelInner>,
    id: u64,
}

impl Subscription {
    /// Detach now rather than at end of scope
    pub fn unsubscribe(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(channel) = self.channel.upgrade() {
            channel.remove(self.id);
            debug!("Listener {} detached from {}", self.id, GEOCODE_EVENT);
        }
    }
}
