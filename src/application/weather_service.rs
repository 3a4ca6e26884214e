// Weather service - Per-polygon hourly readings for the map timeline
use crate::application::color_rules::{self, Reading};
use crate::application::weather_provider::{WeatherError, WeatherProvider};
use crate::domain::errors::DomainError;
use crate::domain::polygon::Polygon;
use crate::domain::time_window::floor_to_hour;
use crate::domain::weather::{hourly_parameter, WeatherQuery, WeatherSeries};
use chrono::{DateTime, NaiveTime, TimeDelta, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Map timeline: which field to show and which hours of the lookback window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherTimeline {
    pub data_type: String,
    pub time_range: (u32, u32),
    pub origin: DateTime<Utc>,
    pub total_hours: u32,
}

impl WeatherTimeline {
    /// Whole lookback window ending at `now` (floored to the hour)
    pub fn new(now: DateTime<Utc>, lookback_days: u32, data_type: impl Into<String>) -> Self {
        let total_hours = lookback_days * 24;
        Self {
            data_type: data_type.into(),
            time_range: (0, total_hours),
            origin: floor_to_hour(now) - TimeDelta::days(lookback_days as i64),
            total_hours,
        }
    }

    /// Clamp both ends into the window and order them
    pub fn set_time_range(&mut self, start: u32, end: u32) {
        let start = start.min(self.total_hours);
        let end = end.min(self.total_hours);
        self.time_range = (start.min(end), start.max(end));
    }

    pub fn instant_at(&self, hours: u32) -> DateTime<Utc> {
        self.origin + TimeDelta::hours(hours as i64)
    }

    /// Row of the fetched series that holds the first selected hour.
    ///
    /// Archive series start at midnight of `start_date`, so this is the
    /// hour of day of `instant_at(time_range.0)`.
    pub fn time_index(&self) -> usize {
        let start = self.instant_at(self.time_range.0);
        let midnight = start.date_naive().and_time(NaiveTime::MIN).and_utc();
        (start - midnight).num_hours() as usize
    }

    /// Upstream field a polygon is colored by
    pub fn field_for<'a>(&'a self, polygon: &'a Polygon) -> &'a str {
        hourly_parameter(polygon.data_source.as_deref().unwrap_or(&self.data_type))
    }

    /// Archive request for the polygon's centroid over the selected hours
    pub fn query_for(&self, polygon: &Polygon) -> Result<WeatherQuery, DomainError> {
        let center = polygon.geo_json.centroid()?;
        Ok(WeatherQuery {
            latitude: center.lat().to_string(),
            longitude: center.lng().to_string(),
            start_date: self.instant_at(self.time_range.0).format("%Y-%m-%d").to_string(),
            end_date: self.instant_at(self.time_range.1).format("%Y-%m-%d").to_string(),
            data_type: self.field_for(polygon).to_string(),
        })
    }
}

/// How a single fetch ended
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied,
    /// A newer fetch for the same polygon was issued meanwhile
    Stale,
    Failed(String),
}

/// An issued fetch: the query and the generation it must still hold
#[derive(Debug)]
struct FetchTicket {
    polygon_id: String,
    query: WeatherQuery,
    generation: u64,
}

#[derive(Debug, Default)]
struct WeatherState {
    by_polygon: HashMap<String, WeatherSeries>,
    generations: HashMap<String, u64>,
    errors: HashMap<String, String>,
}

#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    timeline: Arc<RwLock<WeatherTimeline>>,
    state: Arc<RwLock<WeatherState>>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>, timeline: WeatherTimeline) -> Self {
        Self {
            provider,
            timeline: Arc::new(RwLock::new(timeline)),
            state: Arc::new(RwLock::new(WeatherState::default())),
        }
    }

    pub fn provider(&self) -> Arc<dyn WeatherProvider> {
        self.provider.clone()
    }

    pub async fn timeline(&self) -> WeatherTimeline {
        self.timeline.read().await.clone()
    }

    pub async fn set_timeline(&self, data_type: Option<String>, time_range: Option<(u32, u32)>) -> WeatherTimeline {
        let mut timeline = self.timeline.write().await;
        if let Some(data_type) = data_type {
            timeline.data_type = data_type;
        }
        if let Some((start, end)) = time_range {
            timeline.set_time_range(start, end);
        }
        timeline.clone()
    }

    /// Fetch readings for `polygon` and replace its entry wholesale.
    ///
    /// Each call takes a new generation for the polygon; a response is only
    /// applied if no newer call was issued before it resolved. Failures keep
    /// the previous readings and record the error.
    pub async fn refresh(&self, polygon: &Polygon) -> FetchOutcome {
        match self.issue(polygon).await {
            Ok(ticket) => self.complete(ticket).await,
            Err(outcome) => outcome,
        }
    }

    /// Issue the fetch now and resolve it on a spawned task.
    ///
    /// The generation is taken before returning, so a `forget` or `clear`
    /// that follows makes the response stale.
    pub async fn spawn_refresh(&self, polygon: Polygon) {
        let Ok(ticket) = self.issue(&polygon).await else {
            return;
        };
        let service = self.clone();
        tokio::spawn(async move {
            service.complete(ticket).await;
        });
    }

    async fn issue(&self, polygon: &Polygon) -> Result<FetchTicket, FetchOutcome> {
        let query = self.timeline.read().await.query_for(polygon).map_err(|e| {
            tracing::warn!("Skipping weather fetch for {}: {}", polygon.id, e);
            FetchOutcome::Failed(e.to_string())
        })?;

        let mut state = self.state.write().await;
        let generation = state.generations.entry(polygon.id.clone()).or_insert(0);
        *generation += 1;
        Ok(FetchTicket {
            polygon_id: polygon.id.clone(),
            query,
            generation: *generation,
        })
    }

    async fn complete(&self, ticket: FetchTicket) -> FetchOutcome {
        let FetchTicket {
            polygon_id,
            query,
            generation,
        } = ticket;
        let result = self
            .provider
            .fetch_hourly(&query)
            .await
            .and_then(|body| serde_json::from_value::<WeatherSeries>(body).map_err(WeatherError::from));

        let mut state = self.state.write().await;
        if state.generations.get(&polygon_id) != Some(&generation) {
            tracing::debug!("Discarding stale weather response for {} (generation {})", polygon_id, generation);
            return FetchOutcome::Stale;
        }

        match result {
            Ok(series) => {
                state.by_polygon.insert(polygon_id.clone(), series);
                state.errors.remove(&polygon_id);
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::error!("Weather fetch failed for {}: {}", polygon_id, e);
                let message = e.to_string();
                state.errors.insert(polygon_id, message.clone());
                FetchOutcome::Failed(message)
            }
        }
    }

    /// Drop everything held for a deleted polygon; in-flight responses become stale
    pub async fn forget(&self, polygon_id: &str) {
        let mut state = self.state.write().await;
        state.by_polygon.remove(polygon_id);
        state.generations.remove(polygon_id);
        state.errors.remove(polygon_id);
    }

    pub async fn clear(&self) {
        *self.state.write().await = WeatherState::default();
    }

    /// Display color, legend reading and last fetch error for `polygon`
    pub async fn overlay(&self, polygon: &Polygon) -> Overlay {
        let timeline = self.timeline.read().await;
        let state = self.state.read().await;
        let field = timeline.field_for(polygon);
        let index = timeline.time_index();

        let color = color_rules::resolve_color(polygon, &state.by_polygon, field, index);
        let reading = color_rules::read_value(state.by_polygon.get(&polygon.id), field, index);

        Overlay {
            color,
            label: color_rules::format_reading(reading, field),
            reading,
            error: state.errors.get(&polygon.id).cloned(),
        }
    }

    pub async fn series_for(&self, polygon_id: &str) -> Option<WeatherSeries> {
        self.state.read().await.by_polygon.get(polygon_id).cloned()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Overlay {
    pub color: String,
    pub reading: Reading,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
