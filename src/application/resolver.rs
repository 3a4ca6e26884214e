// Pick the "current" snapshot for an instant or an interval
use crate::domain::errors::DomainError;
use crate::domain::metrics::MetricSnapshot;
use crate::domain::time_window::TimeWindow;
use chrono::{DateTime, Utc};

/// Snapshot nearest to `target`; ties go to the earliest index
pub fn resolve_instant(
    series: &[MetricSnapshot],
    target: DateTime<Utc>,
) -> Result<MetricSnapshot, DomainError> {
    let mut points = series.iter();
    let mut closest = points.next().ok_or(DomainError::EmptySeries)?;
    let mut min_diff = (closest.timestamp - target).abs();

    for point in points {
        let diff = (point.timestamp - target).abs();
        if diff < min_diff {
            min_diff = diff;
            closest = point;
        }
    }

    Ok(closest.clone())
}

/// Field-wise mean over `start..=end`, stamped with `end`.
///
/// Equal bounds degrade to [`resolve_instant`]. An interval that holds no
/// points falls back to the snapshot nearest `end`.
pub fn resolve_range(
    series: &[MetricSnapshot],
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<MetricSnapshot, DomainError> {
    if series.is_empty() {
        return Err(DomainError::EmptySeries);
    }
    if start == end {
        return resolve_instant(series, start);
    }

    let in_range: Vec<&MetricSnapshot> = series
        .iter()
        .filter(|p| p.timestamp >= start && p.timestamp <= end)
        .collect();

    match MetricSnapshot::mean_of(&in_range, end) {
        Some(mean) => Ok(mean),
        None => {
            tracing::debug!("No snapshots in {}..={}, using nearest to end", start, end);
            resolve_instant(series, end)
        }
    }
}

pub fn resolve_window(
    series: &[MetricSnapshot],
    window: &TimeWindow,
) -> Result<MetricSnapshot, DomainError> {
    match *window {
        TimeWindow::Single { at } => resolve_instant(series, at),
        TimeWindow::Range { start, end } => resolve_range(series, start, end),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::tests::snapshot_at;
    use chrono::{TimeDelta, TimeZone};

    fn t(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 16, hour, minute, 0).unwrap()
    }

    fn hourly(from: u32, to: u32) -> Vec<MetricSnapshot> {
        (from..=to)
            .map(|h| snapshot_at(t(h, 0), h as f64 * 10.0))
            .collect()
    }

    #[test]
    fn test_empty_series() {
        assert_eq!(resolve_instant(&[], t(1, 0)), Err(DomainError::EmptySeries));
        assert_eq!(resolve_range(&[], t(1, 0), t(2, 0)), Err(DomainError::EmptySeries));
    }

    #[test]
    fn test_nearest_neighbor() {
        let series = hourly(0, 10);
        let found = resolve_instant(&series, t(4, 20)).unwrap();
        assert_eq!(found.timestamp, t(4, 0));
        let found = resolve_instant(&series, t(4, 40)).unwrap();
        assert_eq!(found.timestamp, t(5, 0));
    }

    #[test]
    fn test_tie_goes_to_earliest() {
        let series = hourly(0, 10);
        let found = resolve_instant(&series, t(4, 30)).unwrap();
        assert_eq!(found.timestamp, t(4, 0));
    }

    #[test]
    fn test_target_outside_series() {
        let series = hourly(2, 5);
        assert_eq!(resolve_instant(&series, t(0, 0)).unwrap().timestamp, t(2, 0));
        assert_eq!(resolve_instant(&series, t(23, 0)).unwrap().timestamp, t(5, 0));
    }

    #[test]
    fn test_range_is_inclusive_mean() {
        let series = hourly(0, 10);
        let mean = resolve_range(&series, t(2, 0), t(4, 0)).unwrap();

        // hours 2, 3, 4 -> bases 20, 30, 40
        assert_eq!(mean.kpis.total_units, 30.0);
        assert_eq!(mean.shareholding.promoter, 30.0 + 16.0);
        assert_eq!(mean.timestamp, t(4, 0));
    }

    #[test]
    fn test_range_with_equal_bounds_is_instant() {
        let series = hourly(0, 10);
        let at = t(6, 10);
        assert_eq!(resolve_range(&series, at, at), resolve_instant(&series, at));
    }

    #[test]
    fn test_empty_range_falls_back_to_nearest_end() {
        let series = hourly(0, 10);
        let found = resolve_range(&series, t(3, 10), t(3, 40)).unwrap();
        assert_eq!(found.timestamp, t(4, 0));
        assert_eq!(found.kpis.total_units, 40.0);
    }

    #[test]
    fn test_resolve_window() {
        let series = hourly(0, 10);
        let single = TimeWindow::Single { at: t(7, 0) };
        assert_eq!(resolve_window(&series, &single).unwrap().timestamp, t(7, 0));

        let range = TimeWindow::Range {
            start: t(0, 0),
            end: t(0, 0) + TimeDelta::hours(10),
        };
        assert_eq!(resolve_window(&series, &range).unwrap().kpis.total_units, 50.0);
    }
}
