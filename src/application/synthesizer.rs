// Expand one seed snapshot into an hourly series around `now`
use crate::domain::metrics::{
    FinancialMetrics, Kpis, MetricSnapshot, NetworkStatus, OperationalMetrics, Shareholding,
    TimeSeries,
};
use chrono::{DateTime, TimeDelta, Timelike, Utc};
use rand::Rng;
use std::f64::consts::PI;

const RANDOM_SPREAD: f64 = 0.025;

/// One point per hour from `now - days` to `now + days` inclusive.
///
/// A single random draw per point is shared by every field of that point.
pub fn synthesize<R: Rng>(
    seed: &MetricSnapshot,
    now: DateTime<Utc>,
    days: i64,
    rng: &mut R,
) -> TimeSeries {
    let start = now - TimeDelta::days(days);
    let end = now + TimeDelta::days(days);
    let day_ms = TimeDelta::days(1).num_milliseconds();

    let mut series = Vec::with_capacity((days * 2 * 24 + 1).max(0) as usize);
    let mut at = start;
    while at <= end {
        let day_offset = (at - now).num_milliseconds().div_euclid(day_ms);
        let variation = Variation {
            time_of_day: 0.1 * (2.0 * PI * at.hour() as f64 / 24.0).sin(),
            day: 0.2 * (day_offset as f64 / 30.0),
            random: rng.gen_range(-RANDOM_SPREAD..=RANDOM_SPREAD),
        };
        series.push(variation.apply(seed, at));
        at += TimeDelta::hours(1);
    }

    tracing::debug!("Synthesized {} hourly snapshots around {}", series.len(), now);
    series
}

struct Variation {
    time_of_day: f64,
    day: f64,
    random: f64,
}

impl Variation {
    fn total(&self) -> f64 {
        1.0 + self.time_of_day + self.day + self.random
    }

    fn apply(&self, seed: &MetricSnapshot, timestamp: DateTime<Utc>) -> MetricSnapshot {
        let total = self.total();
        let r = self.random;

        MetricSnapshot {
            timestamp,
            kpis: Kpis {
                total_units: (seed.kpis.total_units * total).floor(),
                defect_rate: (seed.kpis.defect_rate * (1.0 + r)).max(0.1),
                energy_use: (seed.kpis.energy_use * total).floor(),
                alerts: (seed.kpis.alerts * (1.0 + r * 2.0)).floor().max(0.0),
            },
            network_status: NetworkStatus {
                uptime: (seed.network_status.uptime + r * 2.0).clamp(95.0, 100.0),
                avg_latency: (seed.network_status.avg_latency * (1.0 + r)).floor().max(50.0),
                energy_usage: (seed.network_status.energy_usage * total).floor(),
                avg_temp: (seed.network_status.avg_temp * (1.0 + r * 0.2)).floor(),
            },
            financial_metrics: FinancialMetrics {
                revenue_ytd: seed.financial_metrics.revenue_ytd * (1.0 + self.day),
                monthly_revenue: seed.financial_metrics.monthly_revenue * total,
                profit_growth: seed.financial_metrics.profit_growth * (1.0 + r * 0.5),
            },
            operational_metrics: OperationalMetrics {
                active_factories: (seed.operational_metrics.active_factories
                    + (r * 2.0).floor())
                .clamp(3.0, 4.0),
                total_workers: (seed.operational_metrics.total_workers * (1.0 + r * 0.1)).floor(),
                efficiency_rate: (seed.operational_metrics.efficiency_rate * (1.0 + r * 0.1))
                    .clamp(85.0, 100.0),
            },
            shareholding: Shareholding {
                institutional: (seed.shareholding.institutional + r * 5.0).clamp(65.0, 75.0),
                retail: (seed.shareholding.retail + r * 3.0).clamp(20.0, 30.0),
                promoter: seed.shareholding.promoter,
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    pub(crate) fn seed_snapshot() -> MetricSnapshot {
        MetricSnapshot {
            timestamp: Utc.with_ymd_and_hms(2024, 12, 16, 12, 0, 0).unwrap(),
            kpis: Kpis {
                total_units: 1_000_000.0,
                defect_rate: 0.5,
                energy_use: 150.0,
                alerts: 3.0,
            },
            network_status: NetworkStatus {
                uptime: 99.2,
                avg_latency: 120.0,
                energy_usage: 340.0,
                avg_temp: 42.0,
            },
            financial_metrics: FinancialMetrics {
                revenue_ytd: 12_500_000.0,
                monthly_revenue: 1_100_000.0,
                profit_growth: 8.4,
            },
            operational_metrics: OperationalMetrics {
                active_factories: 4.0,
                total_workers: 1250.0,
                efficiency_rate: 92.5,
            },
            shareholding: Shareholding {
                institutional: 70.0,
                retail: 25.0,
                promoter: 5.0,
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 12, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_hourly_points_across_window() {
        let mut rng = StdRng::seed_from_u64(7);
        let series = synthesize(&seed_snapshot(), now(), 15, &mut rng);

        assert_eq!(series.len(), 721);
        assert_eq!(series[0].timestamp, now() - TimeDelta::days(15));
        assert_eq!(series[720].timestamp, now() + TimeDelta::days(15));
        assert!(series
            .windows(2)
            .all(|w| w[1].timestamp - w[0].timestamp == TimeDelta::hours(1)));
    }

    #[test]
    fn test_fields_stay_in_domain_bounds() {
        let mut rng = StdRng::seed_from_u64(42);
        let series = synthesize(&seed_snapshot(), now(), 15, &mut rng);

        for point in &series {
            assert!((95.0..=100.0).contains(&point.network_status.uptime));
            assert!((85.0..=100.0).contains(&point.operational_metrics.efficiency_rate));
            assert!((3.0..=4.0).contains(&point.operational_metrics.active_factories));
            assert!(point.kpis.defect_rate >= 0.1);
            assert!(point.network_status.avg_latency >= 50.0);
            assert!(point.kpis.alerts >= 0.0);
            assert_eq!(point.shareholding.promoter, 5.0);
        }
    }

    #[test]
    fn test_point_at_noon_has_no_time_of_day_term() {
        let mut rng = StdRng::seed_from_u64(1);
        let series = synthesize(&seed_snapshot(), now(), 15, &mut rng);

        let noon = &series[360];
        assert_eq!(noon.timestamp, now());
        let units = noon.kpis.total_units;
        assert!((974_000.0..=1_026_000.0).contains(&units), "units was {}", units);
        // revenueYTD only moves with the day offset, which is zero here
        assert_eq!(noon.financial_metrics.revenue_ytd, 12_500_000.0);
    }

    #[test]
    fn test_same_rng_seed_is_reproducible() {
        let a = synthesize(&seed_snapshot(), now(), 1, &mut StdRng::seed_from_u64(3));
        let b = synthesize(&seed_snapshot(), now(), 1, &mut StdRng::seed_from_u64(3));
        assert_eq!(a, b);
    }
}
