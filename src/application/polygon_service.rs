// Polygon service - Applies polygon intents, persists the saved subset and
// keeps weather readings in step with polygon changes
use crate::application::polygon_repository::PolygonRepository;
use crate::application::polygon_store::{PolygonIntent, PolygonState};
use crate::application::weather_service::{Overlay, WeatherService};
use crate::domain::errors::DomainError;
use crate::domain::polygon::Polygon;
use crate::domain::weather::WeatherSeries;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A polygon as the map shows it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolygonView {
    #[serde(flatten)]
    pub polygon: Polygon,
    pub visible: bool,
    pub saved: bool,
    pub selected: bool,
    pub overlay: Overlay,
}

#[derive(Clone)]
pub struct PolygonService {
    repository: Arc<dyn PolygonRepository>,
    state: Arc<RwLock<PolygonState>>,
    weather: WeatherService,
}

impl PolygonService {
    pub fn new(repository: Arc<dyn PolygonRepository>, weather: WeatherService) -> Self {
        Self {
            repository,
            state: Arc::new(RwLock::new(PolygonState::default())),
            weather,
        }
    }

    /// Load saved polygons from storage and start fetching their weather
    pub async fn hydrate(&self) -> anyhow::Result<usize> {
        let saved = self.repository.load_saved().await?;
        let count = saved.len();
        *self.state.write().await = PolygonState::hydrated(saved);
        self.refresh_all().await;
        Ok(count)
    }

    /// Re-read storage and merge it into the working set
    pub async fn load_saved(&self) -> anyhow::Result<PolygonState> {
        let saved = self.repository.load_saved().await?;
        let mut state = self.state.write().await;
        state.load_saved(saved);
        Ok(state.clone())
    }

    pub async fn state(&self) -> PolygonState {
        self.state.read().await.clone()
    }

    pub async fn apply(&self, intent: PolygonIntent) -> Result<PolygonState, DomainError> {
        let clearing = intent == PolygonIntent::ClearAll;
        let mut state = self.state.write().await;
        let applied = state.apply(intent, Utc::now())?;

        if applied.persist {
            let stored = if clearing {
                self.repository.clear().await
            } else {
                self.repository.store_saved(&state.saved_polygons).await
            };
            if let Err(e) = stored {
                tracing::error!("Error saving polygons: {:#}", e);
            }
        }

        if let Some(id) = &applied.removed {
            self.weather.forget(id).await;
        }
        if clearing {
            self.weather.clear().await;
        }
        if let Some(polygon) = applied.refetch.as_deref().and_then(|id| state.find(id)) {
            self.weather.spawn_refresh(polygon.clone()).await;
        }

        Ok(state.clone())
    }

    /// Refetch weather for every working polygon.
    ///
    /// The store stays read-locked until every fetch is issued so a removal
    /// cannot slip in between.
    pub async fn refresh_all(&self) {
        let state = self.state.read().await;
        tracing::debug!("Refreshing weather for {} polygons", state.polygons.len());
        for polygon in &state.polygons {
            self.weather.spawn_refresh(polygon.clone()).await;
        }
    }

    pub async fn refresh_one(&self, id: &str) -> Result<(), DomainError> {
        let state = self.state.read().await;
        let polygon = state
            .find(id)
            .cloned()
            .ok_or_else(|| DomainError::PolygonNotFound { id: id.to_string() })?;
        self.weather.spawn_refresh(polygon).await;
        Ok(())
    }

    pub async fn weather_for(&self, id: &str) -> Result<Option<WeatherSeries>, DomainError> {
        if self.state.read().await.find(id).is_none() {
            return Err(DomainError::PolygonNotFound { id: id.to_string() });
        }
        Ok(self.weather.series_for(id).await)
    }

    pub async fn views(&self) -> Vec<PolygonView> {
        let state = self.state.read().await.clone();
        let mut views = Vec::with_capacity(state.polygons.len());

        for polygon in state.polygons.iter() {
            views.push(PolygonView {
                visible: !state.is_hidden(&polygon.id),
                saved: state.saved_polygons.iter().any(|s| s.id == polygon.id),
                selected: state.selected_polygon.as_deref() == Some(polygon.id.as_str()),
                overlay: self.weather.overlay(polygon).await,
                polygon: polygon.clone(),
            });
        }

        views
    }
}
