// HTTP request handlers
use crate::application::alert_store::AlertIntent;
use crate::application::playback::{DateIntent, DateView, SliderPosition};
use crate::application::polygon_store::PolygonIntent;
use crate::application::weather_provider::WeatherError;
use crate::domain::alert::AlertDraft;
use crate::domain::errors::DomainError;
use crate::domain::geometry::{approximate_area_sq_km, LngLat};
use crate::domain::polygon::{ColorRuleDraft, GeoPolygon, PolygonDraft, PolygonUpdate};
use crate::domain::weather::{hourly_parameter, WeatherQuery, TEMPERATURE};
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::sse::stream_from_watch;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/api/weather-data", get(weather_data))
        .route("/dashboard", get(get_dashboard))
        .route("/dashboard/series", get(dashboard_series))
        .route("/timeline/date", get(get_date_state).post(dispatch_date_intent))
        .route("/timeline/date/slider", post(move_date_slider))
        .route("/timeline/date/stream", get(stream_date_state))
        .route("/timeline/weather", get(get_weather_timeline).post(set_weather_timeline))
        .route(
            "/polygons",
            get(list_polygons).post(create_polygon).delete(clear_polygons),
        )
        .route("/polygons/intents", post(dispatch_polygon_intent))
        .route("/polygons/save-all", post(save_all_polygons))
        .route("/polygons/clear-unsaved", post(clear_unsaved_polygons))
        .route("/polygons/load-saved", post(load_saved_polygons))
        .route("/polygons/:id", patch(update_polygon).delete(delete_polygon))
        .route("/polygons/:id/select", post(select_polygon))
        .route("/polygons/:id/visibility", post(toggle_visibility))
        .route("/polygons/:id/save", post(save_polygon))
        .route("/polygons/:id/rules", post(add_rule))
        .route("/polygons/:id/rules/:rule_id", delete(remove_rule))
        .route("/polygons/:id/weather", get(polygon_weather).post(refresh_weather))
        .route("/map/area", get(map_area))
        .route("/alerts", get(list_alerts).post(create_alert).delete(clear_alerts))
        .route("/alerts/intents", post(dispatch_alert_intent))
        .route("/alerts/stream", get(stream_alerts))
        .route("/alerts/:id/read", post(mark_alert_read))
        .with_state(state)
}

async fn reply<T: Serialize>(status: StatusCode, data: &T, headers: &HeaderMap) -> Response {
    match json_response(status, data, accepts_brotli(headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

fn domain_status(error: &DomainError) -> StatusCode {
    match error {
        DomainError::PolygonNotFound { .. }
        | DomainError::RuleNotFound { .. }
        | DomainError::AlertNotFound { .. } => StatusCode::NOT_FOUND,
        DomainError::InvalidRing { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        DomainError::InvalidSpeed(_) => StatusCode::BAD_REQUEST,
        DomainError::EmptySeries => StatusCode::OK,
    }
}

async fn domain_error(error: DomainError, headers: &HeaderMap) -> Response {
    tracing::warn!("Rejected request: {}", error);
    reply(domain_status(&error), &json!({ "error": error.to_string() }), headers).await
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

#[derive(Debug, Deserialize)]
pub struct WeatherParams {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub data_type: Option<String>,
}

impl WeatherParams {
    fn into_query(self) -> Result<WeatherQuery, WeatherError> {
        let required = |v: Option<String>| {
            v.filter(|s| !s.is_empty())
                .ok_or(WeatherError::MissingParameters)
        };
        let data_type = self.data_type.unwrap_or_else(|| TEMPERATURE.to_string());
        Ok(WeatherQuery {
            latitude: required(self.latitude)?,
            longitude: required(self.longitude)?,
            start_date: required(self.start_date)?,
            end_date: required(self.end_date)?,
            data_type: hourly_parameter(&data_type).to_string(),
        })
    }
}

fn weather_failure(error: &WeatherError) -> (StatusCode, &'static str) {
    match error {
        WeatherError::MissingParameters => (
            StatusCode::BAD_REQUEST,
            "Missing required query parameters: latitude, longitude, start_date, end_date",
        ),
        WeatherError::Upstream { status, .. } => (
            StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
            "Failed to fetch data from Open-Meteo",
        ),
        WeatherError::Transport(_) | WeatherError::Decode(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
        }
    }
}

/// Pass-through to the weather archive
pub async fn weather_data(
    Query(params): Query<WeatherParams>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let result = match params.into_query() {
        Ok(query) => state.weather_service.provider().fetch_hourly(&query).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(body) => reply(StatusCode::OK, &body, &headers).await,
        Err(e) => {
            tracing::error!("Error fetching weather data: {}", e);
            let (status, message) = weather_failure(&e);
            reply(status, &json!({ "error": message }), &headers).await
        }
    }
}

/// Metric cards for the currently selected time window
pub async fn get_dashboard(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let window = state.playback_service.snapshot().await.window;
    let view = state.dashboard_service.get_dashboard(window, Utc::now());
    reply(StatusCode::OK, &view, &headers).await
}

/// Full hourly series for the charts
pub async fn dashboard_series(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    reply(StatusCode::OK, &state.dashboard_service.series(), &headers).await
}

pub async fn get_date_state(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let view = DateView::from(state.playback_service.snapshot().await);
    reply(StatusCode::OK, &view, &headers).await
}

pub async fn dispatch_date_intent(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(intent): Json<DateIntent>,
) -> Response {
    tracing::debug!("Date intent: {:?}", intent);
    let after = state.playback_service.dispatch(intent).await;
    reply(StatusCode::OK, &DateView::from(after), &headers).await
}

/// Slider drag by hour index or percent; lands on an hour boundary
pub async fn move_date_slider(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(position): Json<SliderPosition>,
) -> Response {
    let bounds = state.playback_service.snapshot().await.bounds;
    let Some(intent) = position.to_intent(&bounds) else {
        return reply(
            StatusCode::BAD_REQUEST,
            &json!({ "error": "Expected hourIndex or percent" }),
            &headers,
        )
        .await;
    };
    let after = state.playback_service.dispatch(intent).await;
    reply(StatusCode::OK, &DateView::from(after), &headers).await
}

/// Date state changes, playback ticks included, as server-sent events
pub async fn stream_date_state(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_watch(state.playback_service.subscribe(), "date")
}

pub async fn get_weather_timeline(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    reply(StatusCode::OK, &state.weather_service.timeline().await, &headers).await
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineUpdate {
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub time_range: Option<(u32, u32)>,
}

/// Change the map data type or hour range and refetch every polygon
pub async fn set_weather_timeline(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(update): Json<TimelineUpdate>,
) -> Response {
    let timeline = state
        .weather_service
        .set_timeline(update.data_type, update.time_range)
        .await;
    state.polygon_service.refresh_all().await;
    reply(StatusCode::OK, &timeline, &headers).await
}

pub async fn list_polygons(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    reply(StatusCode::OK, &state.polygon_service.views().await, &headers).await
}

async fn apply_intent(state: &AppState, intent: PolygonIntent, headers: &HeaderMap) -> Response {
    match state.polygon_service.apply(intent).await {
        Ok(after) => reply(StatusCode::OK, &after, headers).await,
        Err(e) => domain_error(e, headers).await,
    }
}

/// Body for a finished drawing: either a ring or the raw drawn vertices
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPolygon {
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub data_source: Option<String>,
    #[serde(default)]
    pub geo_json: Option<GeoPolygon>,
    #[serde(default)]
    pub vertices: Option<Vec<LngLat>>,
}

impl NewPolygon {
    fn into_draft(self) -> PolygonDraft {
        let geo_json = match (self.geo_json, self.vertices) {
            (Some(geo_json), _) => geo_json,
            (None, vertices) => GeoPolygon::from_drawn_vertices(vertices.unwrap_or_default()),
        };
        PolygonDraft {
            name: self.name,
            geo_json,
            color: self.color,
            data_source: self.data_source,
        }
    }
}

pub async fn create_polygon(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(body): Json<NewPolygon>,
) -> Response {
    let draft = body.into_draft();
    apply_intent(&state, PolygonIntent::Add { draft }, &headers).await
}

/// Any polygon intent, as the map client emits them
pub async fn dispatch_polygon_intent(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(intent): Json<PolygonIntent>,
) -> Response {
    apply_intent(&state, intent, &headers).await
}

pub async fn clear_polygons(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    apply_intent(&state, PolygonIntent::ClearAll, &headers).await
}

pub async fn update_polygon(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(update): Json<PolygonUpdate>,
) -> Response {
    apply_intent(&state, PolygonIntent::Update { id, update }, &headers).await
}

pub async fn delete_polygon(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    apply_intent(&state, PolygonIntent::Remove { id }, &headers).await
}

pub async fn select_polygon(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    if state.polygon_service.state().await.find(&id).is_none() {
        return domain_error(DomainError::PolygonNotFound { id }, &headers).await;
    }
    apply_intent(&state, PolygonIntent::Select { id: Some(id) }, &headers).await
}

pub async fn toggle_visibility(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    apply_intent(&state, PolygonIntent::ToggleVisibility { id }, &headers).await
}

pub async fn save_polygon(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    apply_intent(&state, PolygonIntent::Save { id }, &headers).await
}

pub async fn save_all_polygons(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    apply_intent(&state, PolygonIntent::SaveAll, &headers).await
}

pub async fn clear_unsaved_polygons(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    apply_intent(&state, PolygonIntent::ClearUnsaved, &headers).await
}

/// Re-read storage and refetch weather for the merged set
pub async fn load_saved_polygons(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.polygon_service.load_saved().await {
        Ok(after) => {
            state.polygon_service.refresh_all().await;
            reply(StatusCode::OK, &after, &headers).await
        }
        Err(e) => {
            tracing::error!("Error loading saved polygons: {:#}", e);
            reply(
                StatusCode::INTERNAL_SERVER_ERROR,
                &json!({ "error": "Failed to load saved polygons" }),
                &headers,
            )
            .await
        }
    }
}

pub async fn add_rule(
    Path(polygon_id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(rule): Json<ColorRuleDraft>,
) -> Response {
    apply_intent(&state, PolygonIntent::AddRule { polygon_id, rule }, &headers).await
}

pub async fn remove_rule(
    Path((polygon_id, rule_id)): Path<(String, String)>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    apply_intent(&state, PolygonIntent::RemoveRule { polygon_id, rule_id }, &headers).await
}

pub async fn polygon_weather(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.polygon_service.weather_for(&id).await {
        Ok(series) => reply(StatusCode::OK, &series, &headers).await,
        Err(e) => domain_error(e, &headers).await,
    }
}

/// Manual retry of a polygon's weather fetch
pub async fn refresh_weather(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.polygon_service.refresh_one(&id).await {
        Ok(()) => reply(StatusCode::ACCEPTED, &json!({ "refreshing": id }), &headers).await,
        Err(e) => domain_error(e, &headers).await,
    }
}

#[derive(Debug, Deserialize)]
pub struct AreaParams {
    pub zoom: f64,
    pub latitude: f64,
}

/// Approximate area covered by the map viewport
pub async fn map_area(Query(params): Query<AreaParams>, headers: HeaderMap) -> Response {
    let area = approximate_area_sq_km(params.zoom, params.latitude);
    reply(StatusCode::OK, &json!({ "areaSqKm": area }), &headers).await
}

pub async fn list_alerts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    let alerts = state.alert_service.snapshot().await;
    reply(
        StatusCode::OK,
        &json!({ "alerts": alerts.alerts, "lastAlertId": alerts.last_alert_id, "unread": alerts.unread() }),
        &headers,
    )
    .await
}

async fn apply_alert_intent(state: &AppState, intent: AlertIntent, headers: &HeaderMap) -> Response {
    match state.alert_service.dispatch(intent).await {
        Ok(after) => reply(StatusCode::OK, &after, headers).await,
        Err(e) => domain_error(e, headers).await,
    }
}

pub async fn create_alert(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(draft): Json<AlertDraft>,
) -> Response {
    apply_alert_intent(&state, AlertIntent::Add { draft }, &headers).await
}

pub async fn dispatch_alert_intent(
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
    Json(intent): Json<AlertIntent>,
) -> Response {
    apply_alert_intent(&state, intent, &headers).await
}

pub async fn mark_alert_read(
    Path(id): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    apply_alert_intent(&state, AlertIntent::MarkAsRead { id }, &headers).await
}

pub async fn clear_alerts(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response {
    apply_alert_intent(&state, AlertIntent::ClearAll, &headers).await
}

/// Alert list changes, generated alerts included, as server-sent events
pub async fn stream_alerts(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    stream_from_watch(state.alert_service.subscribe(), "alerts")
}
