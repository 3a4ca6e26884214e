// Alert - Plant notifications shown in the alert table
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::High, Severity::Medium, Severity::Low];

    /// Canned descriptions the generator picks from
    pub fn templates(self) -> &'static [&'static str] {
        match self {
            Severity::High => &[
                "Machine 4B temperature critical - exceeding 90°C threshold",
                "Power grid failure detected in Zone C - backup systems activated",
                "Hydraulic system pressure drop below safety limits",
                "Emergency shutdown triggered in Assembly Line 2",
                "Critical sensor malfunction in Quality Control station",
                "Fire suppression system activated in Warehouse B",
            ],
            Severity::Medium => &[
                "Network latency spike detected across monitoring systems",
                "Unusual vibration patterns in Motor Unit 7A",
                "Temperature fluctuation in Cold Storage Unit 3",
                "Maintenance window approaching for Conveyor System 5",
                "Inventory levels approaching reorder threshold",
                "Air quality sensors reporting elevated particulate levels",
            ],
            Severity::Low => &[
                "Routine system health check completed successfully",
                "Minor calibration drift detected in Scale Unit 12",
                "Lighting system scheduled for maintenance next week",
                "WiFi connectivity intermittent in Break Room Area",
                "Parking sensor battery level at 15% in Bay 7",
                "Software update available for Dashboard System",
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub id: String,
    pub severity: Severity,
    pub timestamp: DateTime<Utc>,
    pub description: String,
    #[serde(default)]
    pub is_new: bool,
}

/// Caller-supplied part of a new alert; id and timestamp are assigned on add
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AlertDraft {
    pub severity: Severity,
    pub description: String,
}
