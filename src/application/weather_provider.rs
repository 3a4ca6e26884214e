// Provider trait for hourly weather readings
use crate::domain::weather::WeatherQuery;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Missing required query parameters: latitude, longitude, start_date, end_date")]
    MissingParameters,

    #[error("Upstream weather API returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("Failed to reach upstream weather API: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode weather response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait WeatherProvider: Send + Sync {
    /// Fetch the raw upstream body (`{ hourly: { time, <field>: [...] } }`)
    async fn fetch_hourly(&self, query: &WeatherQuery) -> Result<Value, WeatherError>;
}
