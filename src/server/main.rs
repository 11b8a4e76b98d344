//! HTTP server answering nearby-danger queries.
//!
//! Loads the hazard snapshot at startup (fatal on failure), then serves
//! per-request queries against the active snapshot. Coordinate parsing and
//! validation of the legacy comma-string parameter happens here at the
//! transport boundary; the core only ever sees typed numbers.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use hazardwatch::error::QueryError;
use hazardwatch::hazard::{load_snapshot, LoadOptions, ProximityEngine};

mod config;
use config::ServerConfig;

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Dangerous-road proximity server")]
struct Args {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Hazard geometry JSON file (required unless set in the config file)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Listen address
    #[arg(short, long)]
    listen: Option<String>,

    /// Inclusive danger-score threshold
    #[arg(long)]
    min_score: Option<i32>,

    /// Default query radius in meters
    #[arg(long)]
    radius: Option<f64>,
}

impl Args {
    fn resolve(self) -> Result<ServerConfig> {
        let mut config = match &self.config {
            Some(path) => ServerConfig::load_from_file(path)?,
            None => ServerConfig {
                source_path: self
                    .source
                    .clone()
                    .context("--source is required when no config file is given")?,
                listen: "0.0.0.0:5000".to_string(),
                min_danger_score: hazardwatch::hazard::DEFAULT_MIN_DANGER_SCORE,
                default_radius_meters: hazardwatch::hazard::DEFAULT_RADIUS_METERS,
            },
        };

        if let Some(source) = self.source {
            config.source_path = source;
        }
        if let Some(listen) = self.listen {
            config.listen = listen;
        }
        if let Some(min_score) = self.min_score {
            config.min_danger_score = min_score;
        }
        if let Some(radius) = self.radius {
            config.default_radius_meters = radius;
        }

        Ok(config)
    }
}

/// Application state shared across handlers
struct AppState {
    engine: ProximityEngine,
    source_path: PathBuf,
    load_options: LoadOptions,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::DEBUG)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = Args::parse().resolve()?;

    info!("Hazardwatch server");

    let load_options = LoadOptions {
        min_danger_score: config.min_danger_score,
    };

    // A load failure here is fatal: serving with no hazard set would answer
    // "never dangerous" for every query.
    let snapshot = load_snapshot(&config.source_path, &load_options)
        .with_context(|| format!("loading hazards from {}", config.source_path.display()))?;
    info!(
        "Serving {} hazard geometries, default radius {}m",
        snapshot.len(),
        config.default_radius_meters
    );

    let engine = ProximityEngine::with_default_radius(snapshot, config.default_radius_meters);

    let listen = config.listen.clone();
    let state = Arc::new(AppState {
        engine,
        source_path: config.source_path,
        load_options,
    });

    // Build router
    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/v1/is_danger_nearby", get(danger_handler))
        .route("/v1/reload", post(reload_handler))
        .route("/is_dangerous_road_nearby", get(legacy_danger_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    info!("Starting server on {}", listen);

    let listener = tokio::net::TcpListener::bind(&listen).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        hazards: state.engine.snapshot().len(),
    })
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    hazards: usize,
}

#[derive(Deserialize)]
struct DangerQueryParams {
    lat: f64,
    lon: f64,
    /// Radius in meters; defaults to the configured radius
    radius: Option<f64>,
}

#[derive(Serialize)]
struct DangerResponse {
    success: bool,
    danger_nearby: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    matches: Vec<String>,
}

/// Nearby-danger query with typed parameters
async fn danger_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DangerQueryParams>,
) -> Result<Json<DangerResponse>, (StatusCode, String)> {
    let outcome = state
        .engine
        .is_danger_nearby(params.lat, params.lon, params.radius)
        .map_err(map_query_error)?;

    Ok(Json(DangerResponse {
        success: true,
        danger_nearby: outcome.danger_nearby,
        matches: outcome.matches,
    }))
}

fn map_query_error(e: QueryError) -> (StatusCode, String) {
    match e {
        QueryError::InvalidCoordinate { .. } => (StatusCode::BAD_REQUEST, e.to_string()),
        QueryError::IndexInconsistency { .. } => {
            error!("Internal invariant violation: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

#[derive(Deserialize)]
struct LegacyQueryParams {
    /// "lat,lon" as a single comma-separated string
    coord: Option<String>,
}

#[derive(Serialize)]
struct LegacyResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    dangerous_roads_nearby: Option<bool>,
}

/// Legacy route kept for existing clients: a single `coord=lat,lon` string
/// parameter, parsed here rather than in the core.
async fn legacy_danger_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LegacyQueryParams>,
) -> (StatusCode, Json<LegacyResponse>) {
    let failed = || {
        (
            StatusCode::BAD_REQUEST,
            Json(LegacyResponse {
                success: false,
                dangerous_roads_nearby: None,
            }),
        )
    };

    let Some((lat, lon)) = params.coord.as_deref().and_then(parse_coord) else {
        return failed();
    };

    match state.engine.is_danger_nearby(lat, lon, None) {
        Ok(outcome) => (
            StatusCode::OK,
            Json(LegacyResponse {
                success: true,
                dangerous_roads_nearby: Some(outcome.danger_nearby),
            }),
        ),
        Err(QueryError::InvalidCoordinate { .. }) => failed(),
        Err(e) => {
            error!("Internal invariant violation: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(LegacyResponse {
                    success: false,
                    dangerous_roads_nearby: None,
                }),
            )
        }
    }
}

/// Parse "lat,lon"
fn parse_coord(coord: &str) -> Option<(f64, f64)> {
    let mut parts = coord.splitn(2, ',');
    let lat = parts.next()?.trim().parse().ok()?;
    let lon = parts.next()?.trim().parse().ok()?;
    Some((lat, lon))
}

#[derive(Serialize)]
struct ReloadResponse {
    success: bool,
    hazards: usize,
}

/// Rebuild the snapshot from the configured source and swap it in. On
/// failure the active snapshot stays untouched.
async fn reload_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ReloadResponse>, (StatusCode, String)> {
    let path = state.source_path.clone();
    let options = state.load_options.clone();

    // The build reads from disk and is CPU-bound; keep it off the runtime
    // worker threads.
    let snapshot = tokio::task::spawn_blocking(move || load_snapshot(&path, &options))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(|e| {
            error!("Reload failed, keeping active snapshot: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    let hazards = snapshot.len();
    state.engine.reload(snapshot);
    info!("Reloaded hazard snapshot with {} geometries", hazards);

    Ok(Json(ReloadResponse {
        success: true,
        hazards,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_coord() {
        assert_eq!(parse_coord("49.0134,12.1016"), Some((49.0134, 12.1016)));
        assert_eq!(parse_coord(" 49.0 , 12.1 "), Some((49.0, 12.1)));
        assert_eq!(parse_coord("49.0134"), None);
        assert_eq!(parse_coord("abc,12.1"), None);
        assert_eq!(parse_coord(""), None);
    }
}
