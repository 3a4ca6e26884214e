// Selected instant or interval driving the dashboard
use chrono::{DateTime, DurationRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Truncate an instant down to the top of its hour
pub fn floor_to_hour(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant
        .duration_trunc(TimeDelta::hours(1))
        .unwrap_or(instant)
}

/// Either a single selected instant or an inclusive interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum TimeWindow {
    Single { at: DateTime<Utc> },
    Range { start: DateTime<Utc>, end: DateTime<Utc> },
}

impl TimeWindow {
    pub fn is_range(&self) -> bool {
        matches!(self, TimeWindow::Range { .. })
    }

    /// The instant that decides whether the selection lies in the future
    pub fn leading_edge(&self) -> DateTime<Utc> {
        match *self {
            TimeWindow::Single { at } => at,
            TimeWindow::Range { end, .. } => end,
        }
    }

    /// True when the selection reaches strictly past `reference_now`
    pub fn is_future(&self, reference_now: DateTime<Utc>) -> bool {
        self.leading_edge() > reference_now
    }
}

/// Hour-aligned bounds shared by the sliders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowBounds {
    pub min: DateTime<Utc>,
    pub max: DateTime<Utc>,
}

impl WindowBounds {
    /// Bounds of `days` either side of `now`, both floored to the hour
    pub fn around(now: DateTime<Utc>, days: i64) -> Self {
        let anchor = floor_to_hour(now);
        Self {
            min: floor_to_hour(anchor - TimeDelta::days(days)),
            max: floor_to_hour(anchor + TimeDelta::days(days)),
        }
    }

    pub fn total_hours(&self) -> i64 {
        (self.max - self.min).num_hours()
    }

    /// Instant for an hours-from-start slider index
    pub fn instant_at_hour(&self, index: i64) -> DateTime<Utc> {
        self.min + TimeDelta::hours(index)
    }

    /// Hours-from-start index for an instant, floored
    pub fn hour_index(&self, instant: DateTime<Utc>) -> i64 {
        let millis = (instant - self.min).num_milliseconds();
        millis.div_euclid(TimeDelta::hours(1).num_milliseconds())
    }

    /// Instant at `percent` of the way from `min` to `max`, floored to the hour
    /// (same quantization as playback ticks)
    pub fn instant_at_percent(&self, percent: f64) -> DateTime<Utc> {
        let total_ms = (self.max - self.min).num_milliseconds() as f64;
        let offset = TimeDelta::milliseconds((total_ms * percent / 100.0) as i64);
        floor_to_hour(self.min + offset)
    }

    /// Slider position of an instant, in percent of the whole window
    pub fn percent_of(&self, instant: DateTime<Utc>) -> f64 {
        let total_ms = (self.max - self.min).num_milliseconds() as f64;
        if total_ms == 0.0 {
            return 0.0;
        }
        (instant - self.min).num_milliseconds() as f64 / total_ms * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(d: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, d, h, m, 0).unwrap()
    }

    #[test]
    fn test_floor_to_hour() {
        assert_eq!(floor_to_hour(at(16, 12, 59)), at(16, 12, 0));
        assert_eq!(floor_to_hour(at(16, 12, 0)), at(16, 12, 0));
    }

    #[test]
    fn test_is_future() {
        let now = at(16, 12, 0);
        assert!(TimeWindow::Single { at: at(16, 13, 0) }.is_future(now));
        assert!(!TimeWindow::Single { at: now }.is_future(now));

        let range = TimeWindow::Range { start: at(10, 0, 0), end: at(17, 0, 0) };
        assert!(range.is_future(now));
        let past = TimeWindow::Range { start: at(10, 0, 0), end: at(16, 11, 0) };
        assert!(!past.is_future(now));
    }

    #[test]
    fn test_bounds_and_hour_index() {
        let bounds = WindowBounds::around(at(16, 12, 30), 15);
        assert_eq!(bounds.min, at(1, 12, 0));
        assert_eq!(bounds.max, at(31, 12, 0));
        assert_eq!(bounds.total_hours(), 720);

        assert_eq!(bounds.instant_at_hour(24), at(2, 12, 0));
        assert_eq!(bounds.hour_index(at(2, 12, 59)), 24);
    }

    // Hour quantization is floor, not round: 50% of a 720h window is exactly
    // hour 360, and anything short of the next hour stays on it.
    #[test]
    fn test_percent_mapping_floors_to_hour() {
        let bounds = WindowBounds::around(at(16, 12, 0), 15);
        assert_eq!(bounds.instant_at_percent(50.0), at(16, 12, 0));
        assert_eq!(bounds.instant_at_percent(50.1), at(16, 12, 0));
        assert_eq!(bounds.percent_of(at(16, 12, 0)), 50.0);
    }

    #[test]
    fn test_window_serializes_with_mode_tag() {
        let window = TimeWindow::Single { at: at(16, 12, 0) };
        let json = serde_json::to_value(window).unwrap();
        assert_eq!(json["mode"], "single");
    }
}
