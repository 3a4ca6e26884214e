// Alert store - Newest-first alert list and the intents that change it
use crate::domain::alert::{Alert, AlertDraft, Severity};
use crate::domain::errors::DomainError;
use chrono::{DateTime, TimeDelta, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Older alerts beyond this many are dropped on add
pub const MAX_ALERTS: usize = 20;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum AlertIntent {
    Add { draft: AlertDraft },
    MarkAsRead { id: String },
    ClearAll,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertState {
    pub alerts: Vec<Alert>,
    pub last_alert_id: u64,
}

impl AlertState {
    /// The five alerts present at startup, five minutes apart going back from `now`
    pub fn seeded(now: DateTime<Utc>) -> Self {
        let seeds = [
            (Severity::High, "Machine 3A temperature exceeds critical threshold of 85°C, immediate attention required"),
            (Severity::Medium, "Pressure anomaly detected in pipeline 2 - monitoring closely"),
            (Severity::Low, "Conveyor belt speed slightly below optimal performance parameters"),
            (Severity::High, "Critical failure in cooling system for Unit 7 - production halted"),
            (Severity::Medium, "Network connectivity issues detected in Sector B monitoring systems"),
        ];
        let alerts: Vec<Alert> = seeds
            .iter()
            .zip(0i64..)
            .map(|(&(severity, description), n)| Alert {
                id: (n + 1).to_string(),
                severity,
                timestamp: now - TimeDelta::minutes(5 * n),
                description: description.to_string(),
                is_new: false,
            })
            .collect();

        Self {
            last_alert_id: alerts.len() as u64,
            alerts,
        }
    }

    pub fn unread(&self) -> usize {
        self.alerts.iter().filter(|a| a.is_new).count()
    }

    pub fn apply(&mut self, intent: AlertIntent, now: DateTime<Utc>) -> Result<(), DomainError> {
        match intent {
            AlertIntent::Add { draft } => {
                self.last_alert_id += 1;
                self.alerts.insert(
                    0,
                    Alert {
                        id: self.last_alert_id.to_string(),
                        severity: draft.severity,
                        timestamp: now,
                        description: draft.description,
                        is_new: true,
                    },
                );
                self.alerts.truncate(MAX_ALERTS);
            }
            AlertIntent::MarkAsRead { id } => {
                let alert = self
                    .alerts
                    .iter_mut()
                    .find(|a| a.id == id)
                    .ok_or(DomainError::AlertNotFound { id })?;
                alert.is_new = false;
            }
            // ids keep counting from the last one issued
            AlertIntent::ClearAll => self.alerts.clear(),
        }
        Ok(())
    }
}

/// Uniformly random severity, then a random template of that severity
pub fn random_draft<R: Rng>(rng: &mut R) -> AlertDraft {
    let severity = Severity::ALL[rng.gen_range(0..Severity::ALL.len())];
    let templates = severity.templates();
    AlertDraft {
        severity,
        description: templates[rng.gen_range(0..templates.len())].to_string(),
    }
}
