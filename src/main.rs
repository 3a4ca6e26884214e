// Main entry point - Dependency injection and server setup
mod domain;
mod application;
mod infrastructure;
mod presentation;

use std::{net::SocketAddr, sync::Arc, time::Duration};
use chrono::Utc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::alert_service::{AlertSchedule, AlertService};
use crate::application::alert_store::AlertState;
use crate::application::dashboard_service::DashboardService;
use crate::application::playback::DateState;
use crate::application::playback_service::PlaybackService;
use crate::application::polygon_service::PolygonService;
use crate::application::synthesizer::synthesize;
use crate::application::weather_service::{WeatherService, WeatherTimeline};
use crate::infrastructure::config::load_app_config;
use crate::infrastructure::json_store::JsonFileStore;
use crate::infrastructure::open_meteo::OpenMeteoClient;
use crate::infrastructure::seed_loader::load_seed;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing; RUST_LOG overrides the default filter
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = load_app_config()?;
    let now = Utc::now();

    // Synthesize the metric series from the seed record
    let series = match load_seed(&config.seed.path).await? {
        Some(seed) => synthesize(&seed, now, config.timeline.window_days, &mut rand::thread_rng()),
        None => {
            tracing::warn!("Seed document {} has no records", config.seed.path);
            Vec::new()
        }
    };
    tracing::info!("Synthesized {} hourly snapshots", series.len());

    // Create adapters (infrastructure layer)
    let weather_client = Arc::new(OpenMeteoClient::new(config.weather.archive_url.clone()));
    let polygon_store = Arc::new(JsonFileStore::new(
        config.storage.path.clone(),
        config.storage.key.clone(),
    ));

    // Create services (application layer)
    let weather_service = WeatherService::new(
        weather_client,
        WeatherTimeline::new(
            now,
            config.timeline.weather_lookback_days,
            config.weather.default_data_type.clone(),
        ),
    );
    let polygon_service = PolygonService::new(polygon_store, weather_service.clone());
    match polygon_service.hydrate().await {
        Ok(count) => tracing::info!("Hydrated {} saved polygons", count),
        Err(e) => tracing::error!("Error loading saved polygons: {:#}", e),
    }

    let alert_service = AlertService::new(AlertState::seeded(now));
    alert_service.spawn_generator(AlertSchedule {
        first_after: Duration::from_secs(config.alerts.first_alert_secs),
        min_interval: Duration::from_secs(config.alerts.min_interval_secs),
        max_interval: Duration::from_secs(config.alerts.max_interval_secs),
    });

    let state = Arc::new(AppState {
        alert_service,
        dashboard_service: DashboardService::new(series),
        playback_service: PlaybackService::new(DateState::new(now, config.timeline.window_days)),
        polygon_service,
        weather_service,
    });

    // Build router (presentation layer)
    // JSON bodies are Brotli-encoded by the handlers, so no CompressionLayer
    let app = router(state).layer(TraceLayer::new_for_http());

    // Start server
    let addr: SocketAddr = config.server.bind_addr.parse()?;
    tracing::info!("Starting iiot-dashboard service on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;

    Ok(())
}
