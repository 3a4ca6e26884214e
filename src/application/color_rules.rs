// Rule-based polygon coloring over hourly weather readings
use crate::domain::polygon::Polygon;
use crate::domain::weather::{WeatherSeries, PRECIPITATION, TEMPERATURE, WIND_SPEED};
use serde::Serialize;
use std::collections::HashMap;

/// How far either side of the requested hour to look for readings
const SEARCH_RADIUS: usize = 12;
/// Stop widening the search once this many readings are found
const ENOUGH_NEIGHBORS: usize = 3;

/// A value usable by threshold rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Exact(f64),
    Averaged(f64),
}

impl Sample {
    pub fn value(&self) -> f64 {
        match *self {
            Sample::Exact(v) | Sample::Averaged(v) => v,
        }
    }
}

/// Value at `time_index` (clamped into the series), or a fallback average.
///
/// A gap is filled from readings found scanning outward up to 12 hours,
/// stopping once three are collected, then from the whole series.
pub fn sample_at(readings: &[Option<f64>], time_index: usize) -> Option<Sample> {
    let last = readings.len().checked_sub(1)?;
    let index = time_index.min(last);

    if let Some(value) = readings[index] {
        return Some(Sample::Exact(value));
    }

    let mut nearby = Vec::new();
    for offset in 0..=SEARCH_RADIUS {
        let candidates = if offset == 0 {
            [Some(index), None]
        } else {
            [index.checked_sub(offset), Some(index + offset)]
        };
        for idx in candidates.into_iter().flatten() {
            if let Some(Some(value)) = readings.get(idx) {
                nearby.push(*value);
            }
        }
        if nearby.len() >= ENOUGH_NEIGHBORS {
            break;
        }
    }

    if let Some(avg) = mean(&nearby) {
        return Some(Sample::Averaged(avg));
    }

    let all: Vec<f64> = readings.iter().flatten().copied().collect();
    mean(&all).map(Sample::Averaged)
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Display color for `polygon` at `time_index`.
///
/// Falls back to the polygon's base color when it has no rules, when there is
/// no weather entry or series for `data_type`, when no value can be computed,
/// or when no rule matches. Averaged values are compared exactly like exact ones.
pub fn resolve_color(
    polygon: &Polygon,
    weather_by_polygon: &HashMap<String, WeatherSeries>,
    data_type: &str,
    time_index: usize,
) -> String {
    if polygon.color_rules.is_empty() {
        return polygon.color.clone();
    }

    let sample = weather_by_polygon
        .get(&polygon.id)
        .and_then(|weather| weather.readings(data_type))
        .and_then(|readings| sample_at(&readings, time_index));

    let Some(sample) = sample else {
        return polygon.color.clone();
    };

    let value = sample.value();
    polygon
        .color_rules
        .iter()
        .find(|rule| rule.operator.matches(value, rule.value))
        .map(|rule| rule.color.clone())
        .unwrap_or_else(|| polygon.color.clone())
}

/// Legend state for one polygon
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum Reading {
    Loading,
    NoSource,
    NoData,
    Exact(f64),
    Averaged(f64),
}

pub fn read_value(weather: Option<&WeatherSeries>, data_type: &str, time_index: usize) -> Reading {
    let Some(weather) = weather else {
        return Reading::Loading;
    };
    let Some(readings) = weather.readings(data_type) else {
        return Reading::NoSource;
    };

    match sample_at(&readings, time_index) {
        Some(Sample::Exact(v)) => Reading::Exact(v),
        Some(Sample::Averaged(v)) => Reading::Averaged(v),
        None => Reading::NoData,
    }
}

/// Human-readable legend text, e.g. `"18.5°C (avg)"`
pub fn format_reading(reading: Reading, data_type: &str) -> String {
    let (value, suffix) = match reading {
        Reading::Loading => return "Loading...".to_string(),
        Reading::NoSource => return "No source".to_string(),
        Reading::NoData => return "No data".to_string(),
        Reading::Exact(v) => (v, ""),
        Reading::Averaged(v) => (v, " (avg)"),
    };

    match data_type {
        TEMPERATURE => format!("{:.1}°C{}", value, suffix),
        PRECIPITATION => format!("{:.1}mm{}", value, suffix),
        WIND_SPEED => format!("{:.1}km/h{}", value, suffix),
        _ => format!("{}{}", value, suffix),
    }
}
