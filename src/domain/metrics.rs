// Factory metric domain models
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of numeric fields carried by a snapshot
pub const FIELD_COUNT: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    pub total_units: f64,
    pub defect_rate: f64,
    pub energy_use: f64,
    pub alerts: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub uptime: f64,
    pub avg_latency: f64,
    pub energy_usage: f64,
    pub avg_temp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialMetrics {
    #[serde(rename = "revenueYTD")]
    pub revenue_ytd: f64,
    pub monthly_revenue: f64,
    pub profit_growth: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationalMetrics {
    pub active_factories: f64,
    pub total_workers: f64,
    pub efficiency_rate: f64,
}

/// Ownership split in percent. The three shares are not required to sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shareholding {
    pub institutional: f64,
    pub retail: f64,
    pub promoter: f64,
}

/// One instant's full set of derived business metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Utc>,
    pub kpis: Kpis,
    pub network_status: NetworkStatus,
    pub financial_metrics: FinancialMetrics,
    pub operational_metrics: OperationalMetrics,
    pub shareholding: Shareholding,
}

impl MetricSnapshot {
    /// Flatten every numeric field in a fixed order
    pub fn values(&self) -> [f64; FIELD_COUNT] {
        [
            self.kpis.total_units,
            self.kpis.defect_rate,
            self.kpis.energy_use,
            self.kpis.alerts,
            self.network_status.uptime,
            self.network_status.avg_latency,
            self.network_status.energy_usage,
            self.network_status.avg_temp,
            self.financial_metrics.revenue_ytd,
            self.financial_metrics.monthly_revenue,
            self.financial_metrics.profit_growth,
            self.operational_metrics.active_factories,
            self.operational_metrics.total_workers,
            self.operational_metrics.efficiency_rate,
            self.shareholding.institutional,
            self.shareholding.retail,
            self.shareholding.promoter,
        ]
    }

    /// Inverse of [`MetricSnapshot::values`]
    pub fn from_values(timestamp: DateTime<Utc>, v: [f64; FIELD_COUNT]) -> Self {
        Self {
            timestamp,
            kpis: Kpis {
                total_units: v[0],
                defect_rate: v[1],
                energy_use: v[2],
                alerts: v[3],
            },
            network_status: NetworkStatus {
                uptime: v[4],
                avg_latency: v[5],
                energy_usage: v[6],
                avg_temp: v[7],
            },
            financial_metrics: FinancialMetrics {
                revenue_ytd: v[8],
                monthly_revenue: v[9],
                profit_growth: v[10],
            },
            operational_metrics: OperationalMetrics {
                active_factories: v[11],
                total_workers: v[12],
                efficiency_rate: v[13],
            },
            shareholding: Shareholding {
                institutional: v[14],
                retail: v[15],
                promoter: v[16],
            },
        }
    }

    /// Field-wise arithmetic mean of `points`, stamped with `timestamp`.
    /// Returns `None` for an empty slice.
    pub fn mean_of(points: &[&MetricSnapshot], timestamp: DateTime<Utc>) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let mut sums = [0.0; FIELD_COUNT];
        for point in points {
            for (sum, value) in sums.iter_mut().zip(point.values()) {
                *sum += value;
            }
        }

        let count = points.len() as f64;
        Some(Self::from_values(timestamp, sums.map(|sum| sum / count)))
    }
}

/// Ordered, time-ascending hourly snapshots. Built once, read-only afterward.
pub type TimeSeries = Vec<MetricSnapshot>;
