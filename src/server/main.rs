//! Map front-end server.
//!
//! Mounts one view composition and exposes its scene, mode toggle and search
//! box over HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use atlas::config::Config;
use atlas::map::{ModeChangeOutcome, Scene, SceneHandle, SceneRenderer};
use atlas::search::SearchState;
use atlas::{GeocodeEvent, Suggestion, ViewComposition, ViewMode};

#[derive(Parser, Debug)]
#[command(name = "atlas")]
#[command(about = "Real-estate map front-end server")]
struct Args {
    /// Listen address
    #[arg(short, long, default_value = "0.0.0.0:3000", env = "ATLAS_LISTEN")]
    listen: String,

    /// Optional TOML config file
    #[arg(short, long, env = "ATLAS_CONFIG")]
    config: Option<PathBuf>,

    /// Supabase project URL
    #[arg(long, env = "SUPABASE_URL")]
    supabase_url: Option<String>,

    /// Supabase public (anon) key
    #[arg(long, env = "SUPABASE_ANON_KEY", hide_env_values = true)]
    supabase_anon_key: Option<String>,

    /// Mapbox access token
    #[arg(long, env = "MAPBOX_ACCESS_TOKEN", hide_env_values = true)]
    mapbox_access_token: Option<String>,

    /// Properties table name
    #[arg(long)]
    table: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<(String, Config)> {
        let mut config = match &self.config {
            Some(path) => Config::load_from_file(path)
                .with_context(|| format!("Loading {}", path.display()))?,
            None => Config::default(),
        };

        if self.supabase_url.is_some() {
            config.supabase.url = self.supabase_url;
        }
        if self.supabase_anon_key.is_some() {
            config.supabase.anon_key = self.supabase_anon_key;
        }
        if self.mapbox_access_token.is_some() {
            config.mapbox.access_token = self.mapbox_access_token;
        }
        if let Some(table) = self.table {
            config.supabase.table = table;
        }

        Ok((self.listen, config))
    }
}

/// Application state shared across handlers
struct AppState {
    view: ViewComposition<SceneRenderer>,
    scene: SceneHandle,
    supabase_configured: bool,
    mapbox_configured: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let (listen, config) = Args::parse().into_config()?;

    info!("Atlas map server");

    let missing = config.missing_secrets();
    let renderer = SceneRenderer::new();
    let scene = renderer.handle();
    let view = ViewComposition::mount(&config, renderer).await;

    let state = Arc::new(AppState {
        view,
        scene,
        supabase_configured: !missing.iter().any(|m| m.starts_with("SUPABASE")),
        mapbox_configured: !missing.contains(&"MAPBOX_ACCESS_TOKEN"),
    });

    let app = router(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen)
        .await
        .with_context(|| format!("Binding {}", listen))?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/scene", get(scene_handler))
        .route("/v1/mode", get(mode_handler).post(set_mode_handler))
        .route("/v1/suggest", get(suggest_handler))
        .route("/v1/select", post(select_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let healthy = state.supabase_configured && state.mapbox_configured;
    Json(HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        supabase: state.supabase_configured,
        mapbox: state.mapbox_configured,
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    supabase: bool,
    mapbox: bool,
}

async fn scene_handler(State(state): State<Arc<AppState>>) -> Json<Scene> {
    Json(state.scene.snapshot())
}

#[derive(Serialize)]
struct ModeResponse {
    mode: ViewMode,
    label: &'static str,
}

async fn mode_handler(State(state): State<Arc<AppState>>) -> Json<ModeResponse> {
    let mode = state.view.view_mode();
    Json(ModeResponse {
        mode,
        label: mode.label(),
    })
}

#[derive(Deserialize)]
struct SetModeRequest {
    mode: ViewMode,
}

#[derive(Serialize)]
struct SetModeResponse {
    mode: ViewMode,
    /// Absent when the mode was already selected
    change: Option<ModeChangeOutcome>,
    scene: Scene,
}

/// Mode toggle
async fn set_mode_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SetModeRequest>,
) -> Json<SetModeResponse> {
    let change = state.view.set_view_mode(request.mode).await;
    Json(SetModeResponse {
        mode: state.view.view_mode(),
        change,
        scene: state.scene.snapshot(),
    })
}

#[derive(Deserialize)]
struct SuggestQueryParams {
    /// Current search box text
    #[serde(default)]
    q: String,
}

/// Search box keystroke
async fn suggest_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestQueryParams>,
) -> Json<SearchState> {
    Json(state.view.search().on_input(&params.q).await)
}

#[derive(Serialize)]
struct SelectResponse {
    recenter: Option<GeocodeEvent>,
    search: SearchState,
    scene: Scene,
}

/// Suggestion click
async fn select_handler(
    State(state): State<Arc<AppState>>,
    Json(suggestion): Json<Suggestion>,
) -> Json<SelectResponse> {
    let recenter = state.view.search().on_select(&suggestion).await;
    Json(SelectResponse {
        recenter,
        search: state.view.search().snapshot(),
        scene: state.scene.snapshot(),
    })
}
