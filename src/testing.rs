//! Fake remote sources for unit tests.

use async_trait::async_trait;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::config::MapboxConfig;
use crate::error::{AtlasError, Result};
use crate::mapbox::{GeocodeSource, SearchBoxClient};
use crate::models::{Feature, FeatureGeometry, PropertyRecord, SessionToken, Suggestion, ViewMode};
use crate::supabase::PropertySource;

pub fn record(id: i64, lng: Option<f64>, lat: Option<f64>, status: &str) -> PropertyRecord {
    serde_json::from_value(json!({
        "id": id,
        "longitude": lng,
        "latitude": lat,
        "status": status,
    }))
    .unwrap()
}

pub fn suggestion(name: &str, mapbox_id: &str) -> Suggestion {
    Suggestion {
        name: name.to_string(),
        mapbox_id: mapbox_id.to_string(),
        feature_type: None,
        place_formatted: None,
        full_address: None,
    }
}

pub fn feature(lng: f64, lat: f64) -> Feature {
    Feature {
        geometry: FeatureGeometry {
            geo_type: Some("Point".to_string()),
            coordinates: vec![lng, lat],
        },
        properties: serde_json::Value::Null,
    }
}

/// Serve `router` on an ephemeral local port; returns `http://127.0.0.1:<port>`
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Query strings received by a stub server, in arrival order
pub type Seen = Arc<Mutex<Vec<HashMap<String, String>>>>;

/// Search Box stand-in. The `q` parameter picks the reply: `union*` gives one
/// suggestion, `denied` a 401 JSON error, `outage` a 503 text body, `garbled`
/// a 200 non-JSON body, anything else `{}`. Retrieve knows only `u1`.
pub fn searchbox_stub(seen: Seen) -> Router {
    Router::new()
        .route("/search/searchbox/v1/suggest", get(stub_suggest))
        .route("/search/searchbox/v1/retrieve/{id}", get(stub_retrieve))
        .with_state(seen)
}

async fn stub_suggest(
    State(seen): State<Seen>,
    Query(params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    let q = params.get("q").cloned().unwrap_or_default();
    seen.lock().unwrap().push(params);
    match q.as_str() {
        "denied" => (
            StatusCode::UNAUTHORIZED,
            json!({ "message": "Not Authorized - Invalid Token" }).to_string(),
        ),
        "outage" => (StatusCode::SERVICE_UNAVAILABLE, "upstream unavailable".to_string()),
        "garbled" => (StatusCode::OK, "<html>oops</html>".to_string()),
        q if q.starts_with("union") => (
            StatusCode::OK,
            json!({ "suggestions": [{ "name": "Union Square", "mapbox_id": "u1" }] }).to_string(),
        ),
        _ => (StatusCode::OK, "{}".to_string()),
    }
}

async fn stub_retrieve(
    State(seen): State<Seen>,
    Path(id): Path<String>,
    Query(mut params): Query<HashMap<String, String>>,
) -> (StatusCode, String) {
    params.insert("id".to_string(), id.clone());
    seen.lock().unwrap().push(params);
    if id == "u1" {
        let body = json!({
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-73.99, 40.73] },
                "properties": { "name": "Union Square" }
            }]
        });
        (StatusCode::OK, body.to_string())
    } else {
        (StatusCode::NOT_FOUND, json!({ "message": "Not Found" }).to_string())
    }
}

/// Client pointed at a freshly served [`searchbox_stub`]
pub async fn stub_searchbox_client(seen: Seen) -> SearchBoxClient {
    let base = serve(searchbox_stub(seen)).await;
    SearchBoxClient::new(&MapboxConfig {
        access_token: Some("pk.test".to_string()),
        searchbox_url: format!("{}/search/searchbox/v1", base),
        ..MapboxConfig::default()
    })
}

fn unavailable() -> AtlasError {
    AtlasError::Status {
        service: "fake",
        status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        body: "unavailable".to_string(),
    }
}

/// Fixed rows per mode; modes marked failing return an error
#[derive(Default)]
pub struct StaticSource {
    rows: HashMap<ViewMode, Vec<PropertyRecord>>,
    failing: HashSet<ViewMode>,
    calls: Mutex<Vec<(ViewMode, usize)>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, mode: ViewMode, rows: Vec<PropertyRecord>) -> Self {
        self.rows.insert(mode, rows);
        self
    }

    pub fn failing(mut self, mode: ViewMode) -> Self {
        self.failing.insert(mode);
        self
    }

    pub fn calls(&self) -> Vec<(ViewMode, usize)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PropertySource for StaticSource {
    async fn fetch_by_status(&self, status: ViewMode, limit: usize) -> Result<Vec<PropertyRecord>> {
        self.calls.lock().unwrap().push((status, limit));
        if self.failing.contains(&status) {
            return Err(unavailable());
        }
        let mut rows = self.rows.get(&status).cloned().unwrap_or_default();
        rows.truncate(limit);
        Ok(rows)
    }
}

/// On-market queries block until `release`; off-market ones answer at once
pub struct GatedSource {
    on_market: Vec<PropertyRecord>,
    off_market: Vec<PropertyRecord>,
    blocked: Notify,
    gate: Notify,
}

impl GatedSource {
    pub fn new(on_market: Vec<PropertyRecord>, off_market: Vec<PropertyRecord>) -> Self {
        Self {
            on_market,
            off_market,
            blocked: Notify::new(),
            gate: Notify::new(),
        }
    }

    pub async fn wait_for_blocked(&self) {
        self.blocked.notified().await;
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl PropertySource for GatedSource {
    async fn fetch_by_status(&self, status: ViewMode, _limit: usize) -> Result<Vec<PropertyRecord>> {
        match status {
            ViewMode::OnMarket => {
                self.blocked.notify_one();
                self.gate.notified().await;
                Ok(self.on_market.clone())
            }
            ViewMode::OffMarket => Ok(self.off_market.clone()),
        }
    }
}

/// Scripted geocoder recording every call
#[derive(Default)]
pub struct FakeGeocoder {
    pub suggestions: Option<Vec<Suggestion>>,
    pub features: Vec<Feature>,
    pub fail: AtomicBool,
    pub suggest_calls: Mutex<Vec<(String, SessionToken, usize)>>,
    pub retrieve_calls: Mutex<Vec<(String, SessionToken)>>,
}

impl FakeGeocoder {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn suggest_count(&self) -> usize {
        self.suggest_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl GeocodeSource for FakeGeocoder {
    async fn suggest(&self, query: &str, session: &SessionToken, limit: usize) -> Result<Vec<Suggestion>> {
        self.suggest_calls
            .lock()
            .unwrap()
            .push((query.to_string(), *session, limit));
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.suggestions.clone().unwrap_or_default())
    }

    async fn retrieve(&self, mapbox_id: &str, session: &SessionToken) -> Result<Vec<Feature>> {
        self.retrieve_calls
            .lock()
            .unwrap()
            .push((mapbox_id.to_string(), *session));
        if self.fail.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(self.features.clone())
    }
}
