// Application state for HTTP handlers
use crate::application::alert_service::AlertService;
use crate::application::dashboard_service::DashboardService;
use crate::application::playback_service::PlaybackService;
use crate::application::polygon_service::PolygonService;
use crate::application::weather_service::WeatherService;

#[derive(Clone)]
pub struct AppState {
    pub alert_service: AlertService,
    pub dashboard_service: DashboardService,
    pub playback_service: PlaybackService,
    pub polygon_service: PolygonService,
    pub weather_service: WeatherService,
}
