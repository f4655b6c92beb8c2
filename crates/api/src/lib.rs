//! EyeGuard API Server
//!
//! Axum server for the screen-wellness dashboard: a one-way WebSocket that
//! streams per-frame session metrics, plus a small health endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod session;

use advisory::{AdvisoryProvider, GeminiAdvisor, StaticAdvisor, DEFAULT_MODEL};
use alerting::ThrottleConfig;
use tracker::TrackerConfig;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Tracker(#[from] tracker::TrackerError),
    #[error(transparent)]
    Throttle(#[from] alerting::ThrottleError),
    #[error("server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Scripted landmark source selected at startup.
///
/// Stands in for a camera-plus-detector front end; each variant drives a
/// different wellness scenario end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Face at a comfortable distance with periodic blinks
    Synthetic,
    /// Face spanning most of the frame width
    SyntheticCloseUp,
    /// Face with barely open eyes
    SyntheticDrowsy,
}

/// Server settings, read from an optional `eyeguard` config file with
/// `EYEGUARD_*` environment overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Landmark source driving each session
    pub source: SourceKind,
    /// Gemini API key; unset means static advisories
    pub gemini_api_key: Option<String>,
    /// Gemini model name
    pub gemini_model: String,
    /// Per-session tracker thresholds
    pub tracker: TrackerConfig,
    /// Per-session advisory throttle
    pub throttle: ThrottleConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            source: SourceKind::Synthetic,
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            tracker: TrackerConfig::default(),
            throttle: ThrottleConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from `eyeguard.{toml,yaml,json}` (if present) layered
    /// under `EYEGUARD_*` environment variables. Nested keys use a double
    /// underscore, e.g. `EYEGUARD_TRACKER__BASELINE_BPM=18`.
    pub fn load() -> Result<Self, ApiError> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name("eyeguard").required(false))
            .add_source(
                config::Environment::with_prefix("EYEGUARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings no server should start with.
    pub fn validate(&self) -> Result<(), ApiError> {
        self.tracker.validate()?;
        self.throttle.validate()?;
        Ok(())
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Application state shared across handlers
pub struct AppState {
    /// Server settings
    pub settings: Settings,
    /// Advisory provider shared by every session
    pub provider: Arc<dyn AdvisoryProvider>,
    /// Version string
    pub version: String,
    /// Start time
    pub start_time: std::time::Instant,
    /// Sessions currently connected
    pub active_sessions: AtomicU64,
    /// Sessions accepted since startup
    pub total_sessions: AtomicU64,
}

impl AppState {
    /// Create new application state
    pub fn new(settings: Settings) -> Self {
        let provider = build_provider(&settings);
        Self {
            settings,
            provider,
            version: env!("CARGO_PKG_VERSION").to_string(),
            start_time: std::time::Instant::now(),
            active_sessions: AtomicU64::new(0),
            total_sessions: AtomicU64::new(0),
        }
    }
}

/// Pick the advisory provider for this run. Without an API key the server
/// still alerts, serving the fixed guidance texts.
fn build_provider(settings: &Settings) -> Arc<dyn AdvisoryProvider> {
    match settings.gemini_api_key.as_deref() {
        Some(key) if !key.is_empty() => {
            info!(model = %settings.gemini_model, "Using Gemini advisory provider");
            Arc::new(GeminiAdvisor::new(
                key.to_string(),
                settings.gemini_model.clone(),
            ))
        }
        _ => {
            warn!("No Gemini API key configured, serving static advisories");
            Arc::new(StaticAdvisor)
        }
    }
}

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub service: String,
    pub status: String,
    pub timestamp: u64,
    pub version: String,
    pub uptime_seconds: u64,
    pub sessions: SessionCounts,
}

/// Session counters
#[derive(Debug, Serialize)]
pub struct SessionCounts {
    pub active: u64,
    pub started: u64,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(health_handler))
        .route("/ws/track", get(session::ws_track))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Health check handler
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let response = HealthResponse {
        service: "eyeguard".to_string(),
        status: "running".to_string(),
        timestamp,
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        sessions: SessionCounts {
            active: state.active_sessions.load(Ordering::Relaxed),
            started: state.total_sessions.load(Ordering::Relaxed),
        },
    };

    Json(response)
}

/// Initialize logging
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Run the server until ctrl-c.
pub async fn run_server(settings: Settings) -> Result<(), ApiError> {
    let addr = settings.bind_addr();
    let state = Arc::new(AppState::new(settings));
    let app = create_router(state);

    info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Received shutdown signal");
}
