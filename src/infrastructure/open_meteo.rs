// Open-Meteo archive client with a process-lifetime response cache
use crate::application::weather_provider::{WeatherError, WeatherProvider};
use crate::domain::weather::{hourly_parameter, WeatherQuery};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;

pub struct OpenMeteoClient {
    client: reqwest::Client,
    archive_url: String,
    cache: RwLock<HashMap<String, Value>>,
}

impl OpenMeteoClient {
    pub fn new(archive_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            archive_url: archive_url.trim_end_matches('/').to_string(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn build_url(&self, query: &WeatherQuery) -> String {
        format!(
            "{}?latitude={}&longitude={}&start_date={}&end_date={}&hourly={}",
            self.archive_url,
            urlencoding::encode(&query.latitude),
            urlencoding::encode(&query.longitude),
            urlencoding::encode(&query.start_date),
            urlencoding::encode(&query.end_date),
            urlencoding::encode(hourly_parameter(&query.data_type)),
        )
    }
}

#[async_trait]
impl WeatherProvider for OpenMeteoClient {
    async fn fetch_hourly(&self, query: &WeatherQuery) -> Result<Value, WeatherError> {
        if [&query.latitude, &query.longitude, &query.start_date, &query.end_date]
            .iter()
            .any(|p| p.is_empty())
        {
            return Err(WeatherError::MissingParameters);
        }

        let key = query.cache_key();
        if let Some(cached) = self.cache.read().await.get(&key) {
            tracing::debug!("Serving from cache: {}", key);
            return Ok(cached.clone());
        }

        let url = self.build_url(query);
        tracing::debug!("Fetching weather: {}", url);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::error!("Open-Meteo API error {}: {}", status, body);
            return Err(WeatherError::Upstream { status, body });
        }

        let bytes = response.bytes().await?;
        let data: Value = serde_json::from_slice(&bytes)?;

        self.cache.write().await.insert(key, data.clone());
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query() -> WeatherQuery {
        WeatherQuery {
            latitude: "22.71".to_string(),
            longitude: "88.44".to_string(),
            start_date: "2024-11-16".to_string(),
            end_date: "2024-12-16".to_string(),
            data_type: "Wind Speed".to_string(),
        }
    }

    #[test]
    fn test_build_url_maps_friendly_name() {
        let client = OpenMeteoClient::new("https://archive-api.open-meteo.com/v1/archive/".to_string());
        assert_eq!(
            client.build_url(&query()),
            "https://archive-api.open-meteo.com/v1/archive?latitude=22.71&longitude=88.44\
             &start_date=2024-11-16&end_date=2024-12-16&hourly=wind_speed_10m"
        );
    }

    #[tokio::test]
    async fn test_missing_parameters_rejected_before_request() {
        let client = OpenMeteoClient::new("http://127.0.0.1:9".to_string());
        let mut q = query();
        q.start_date.clear();

        let result = client.fetch_hourly(&q).await;
        assert!(matches!(result, Err(WeatherError::MissingParameters)));
        assert!(client.cache.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        // port 9 is never reached when the key is already cached
        let client = OpenMeteoClient::new("http://127.0.0.1:9".to_string());
        let body = serde_json::json!({"hourly": {"time": ["2024-12-16T00:00"], "wind_speed_10m": [4.2]}});
        client.cache.write().await.insert(query().cache_key(), body.clone());

        assert_eq!(client.fetch_hourly(&query()).await.unwrap(), body);
    }
}
