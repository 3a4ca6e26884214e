// Hourly weather readings for a polygon
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

pub const TEMPERATURE: &str = "temperature_2m";
pub const PRECIPITATION: &str = "precipitation";
pub const WIND_SPEED: &str = "wind_speed_10m";

/// Map a friendly data type name to the upstream hourly parameter.
/// Unknown names pass through unchanged.
pub fn hourly_parameter(data_type: &str) -> &str {
    match data_type {
        "Temperature" => TEMPERATURE,
        "Precipitation" => PRECIPITATION,
        "Wind Speed" => WIND_SPEED,
        other => other,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyReadings {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(flatten)]
    pub fields: HashMap<String, Value>,
}

/// Upstream response body, reduced to the `hourly` block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSeries {
    #[serde(default)]
    pub hourly: HourlyReadings,
}

impl WeatherSeries {
    /// Readings for `field`, or `None` when the field is missing, not an
    /// array, or empty. Non-numeric entries read as gaps.
    pub fn readings(&self, field: &str) -> Option<Vec<Option<f64>>> {
        let values = self.hourly.fields.get(field)?.as_array()?;
        if values.is_empty() {
            return None;
        }
        Some(values.iter().map(Value::as_f64).collect())
    }
}

/// Parameter tuple for one upstream archive request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WeatherQuery {
    pub latitude: String,
    pub longitude: String,
    pub start_date: String,
    pub end_date: String,
    pub data_type: String,
}

impl WeatherQuery {
    pub fn cache_key(&self) -> String {
        format!(
            "{}-{}-{}-{}-{}",
            self.latitude,
            self.longitude,
            self.start_date,
            self.end_date,
            hourly_parameter(&self.data_type)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_hourly_parameter() {
        assert_eq!(hourly_parameter("Wind Speed"), WIND_SPEED);
        assert_eq!(hourly_parameter("temperature_2m"), TEMPERATURE);
        assert_eq!(hourly_parameter("relative_humidity_2m"), "relative_humidity_2m");
    }

    #[test]
    fn test_readings_from_upstream_body() {
        let body = json!({
            "latitude": 22.7,
            "hourly_units": {"temperature_2m": "°C"},
            "hourly": {
                "time": ["2024-12-01T00:00", "2024-12-01T01:00"],
                "temperature_2m": [18.5, null],
                "precipitation": "oops",
                "wind_speed_10m": []
            }
        });
        let series: WeatherSeries = serde_json::from_value(body).unwrap();

        assert_eq!(series.hourly.time.len(), 2);
        assert_eq!(series.readings(TEMPERATURE), Some(vec![Some(18.5), None]));
        assert_eq!(series.readings(PRECIPITATION), None);
        assert_eq!(series.readings(WIND_SPEED), None);
        assert_eq!(series.readings("missing"), None);
    }

    #[test]
    fn test_cache_key_uses_upstream_name() {
        let query = WeatherQuery {
            latitude: "22.7".to_string(),
            longitude: "88.4".to_string(),
            start_date: "2024-11-16".to_string(),
            end_date: "2024-12-16".to_string(),
            data_type: "Temperature".to_string(),
        };
        assert_eq!(query.cache_key(), "22.7-88.4-2024-11-16-2024-12-16-temperature_2m");
    }
}
