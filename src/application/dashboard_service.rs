// Dashboard service - Use case for resolving the metric cards for a time window
use crate::application::resolver::resolve_window;
use crate::domain::errors::DomainError;
use crate::domain::metrics::{MetricSnapshot, TimeSeries};
use crate::domain::time_window::TimeWindow;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// What the dashboard cards render for one time window
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum DashboardView {
    Ready {
        window: TimeWindow,
        is_future: bool,
        snapshot: MetricSnapshot,
    },
    NoData {
        window: TimeWindow,
    },
}

#[derive(Clone)]
pub struct DashboardService {
    series: Arc<TimeSeries>,
}

impl DashboardService {
    pub fn new(series: TimeSeries) -> Self {
        Self {
            series: Arc::new(series),
        }
    }

    pub fn series(&self) -> &[MetricSnapshot] {
        &self.series
    }

    pub fn current(&self, window: &TimeWindow) -> Result<MetricSnapshot, DomainError> {
        resolve_window(&self.series, window)
    }

    pub fn get_dashboard(&self, window: TimeWindow, now: DateTime<Utc>) -> DashboardView {
        match self.current(&window) {
            Ok(snapshot) => DashboardView::Ready {
                window,
                is_future: window.is_future(now),
                snapshot,
            },
            Err(e) => {
                tracing::warn!("No snapshot for {:?}: {}", window, e);
                DashboardView::NoData { window }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::tests::snapshot_at;
    use chrono::{TimeDelta, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 16, 12, 0, 0).unwrap()
    }

    fn hourly(points: i64) -> TimeSeries {
        (0..points)
            .map(|i| snapshot_at(noon() + TimeDelta::hours(i), i as f64 * 10.0))
            .collect()
    }

    #[test]
    fn test_single_window_picks_nearest() {
        let service = DashboardService::new(hourly(5));
        let at = noon() + TimeDelta::minutes(130);

        let view = service.get_dashboard(TimeWindow::Single { at }, noon());
        let DashboardView::Ready { snapshot, is_future, .. } = view else {
            panic!("expected a snapshot");
        };
        assert_eq!(snapshot.timestamp, noon() + TimeDelta::hours(2));
        assert!(is_future);
    }

    #[test]
    fn test_range_window_averages() {
        let service = DashboardService::new(hourly(5));
        let window = TimeWindow::Range {
            start: noon() + TimeDelta::hours(1),
            end: noon() + TimeDelta::hours(3),
        };

        let snapshot = service.current(&window).unwrap();
        assert_eq!(snapshot.kpis.total_units, 20.0);
        assert_eq!(snapshot.timestamp, noon() + TimeDelta::hours(3));
        assert!(!window.is_future(noon() + TimeDelta::hours(3)));
    }

    #[test]
    fn test_empty_series_reports_no_data() {
        let service = DashboardService::new(Vec::new());
        let window = TimeWindow::Single { at: noon() };

        assert_eq!(service.current(&window), Err(DomainError::EmptySeries));
        assert_eq!(
            service.get_dashboard(window, noon()),
            DashboardView::NoData { window }
        );
        let body = serde_json::to_value(service.get_dashboard(window, noon())).unwrap();
        assert_eq!(body["status"], "no_data");
    }
}
