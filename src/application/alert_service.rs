// Alert service - Shared alert list and the background alert generator
use crate::application::alert_store::{random_draft, AlertIntent, AlertState};
use crate::domain::errors::DomainError;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

/// When the generator raises alerts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertSchedule {
    pub first_after: Duration,
    pub min_interval: Duration,
    pub max_interval: Duration,
}

#[derive(Clone)]
pub struct AlertService {
    state: Arc<RwLock<AlertState>>,
    updates: watch::Sender<AlertState>,
}

impl AlertService {
    pub fn new(initial: AlertState) -> Self {
        let (updates, _) = watch::channel(initial.clone());
        Self {
            state: Arc::new(RwLock::new(initial)),
            updates,
        }
    }

    pub async fn snapshot(&self) -> AlertState {
        self.state.read().await.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AlertState> {
        self.updates.subscribe()
    }

    pub async fn dispatch(&self, intent: AlertIntent) -> Result<AlertState, DomainError> {
        let after = {
            let mut state = self.state.write().await;
            state.apply(intent, Utc::now())?;
            state.clone()
        };
        self.updates.send_replace(after.clone());
        Ok(after)
    }

    /// Raise one alert after `first_after`, and independently a chain of
    /// alerts spaced by random intervals counted from the start.
    pub fn spawn_generator(&self, schedule: AlertSchedule) -> JoinHandle<()> {
        let service = self.clone();
        tokio::spawn(async move {
            let mut rng = StdRng::from_entropy();
            let started = Instant::now();
            let first = started + schedule.first_after;
            let mut next = started + pick_interval(&mut rng, &schedule);
            let mut first_pending = true;

            loop {
                let due = if first_pending && first <= next { first } else { next };
                sleep_until(due).await;
                if first_pending && due == first {
                    first_pending = false;
                } else {
                    next += pick_interval(&mut rng, &schedule);
                }

                let draft = random_draft(&mut rng);
                tracing::info!("Raising {:?} alert: {}", draft.severity, draft.description);
                if let Err(e) = service.dispatch(AlertIntent::Add { draft }).await {
                    tracing::error!("Error raising alert: {}", e);
                }
            }
        })
    }
}

fn pick_interval<R: Rng>(rng: &mut R, schedule: &AlertSchedule) -> Duration {
    if schedule.max_interval <= schedule.min_interval {
        return schedule.min_interval;
    }
    rng.gen_range(schedule.min_interval..=schedule.max_interval)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::alert::{AlertDraft, Severity};
    use chrono::TimeZone;

    fn schedule() -> AlertSchedule {
        AlertSchedule {
            first_after: Duration::from_secs(3),
            min_interval: Duration::from_secs(15),
            max_interval: Duration::from_secs(45),
        }
    }

    fn seeded() -> AlertService {
        AlertService::new(AlertState::seeded(
            Utc.with_ymd_and_hms(2024, 12, 16, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn test_dispatch_publishes() {
        let service = seeded();
        let mut rx = service.subscribe();

        let draft = AlertDraft {
            severity: Severity::Medium,
            description: "Valve sticking".to_string(),
        };
        let state = service.dispatch(AlertIntent::Add { draft }).await.unwrap();
        assert_eq!(state.alerts[0].id, "6");

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().alerts.len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_alert_is_not_found() {
        let service = seeded();
        let result = service
            .dispatch(AlertIntent::MarkAsRead { id: "42".to_string() })
            .await;
        assert!(matches!(result, Err(DomainError::AlertNotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_first_alert_after_three_seconds() {
        let service = seeded();
        let generator = service.spawn_generator(schedule());

        tokio::time::sleep(Duration::from_millis(2900)).await;
        assert_eq!(service.snapshot().await.alerts.len(), 5);

        tokio::time::sleep(Duration::from_millis(200)).await;
        let state = service.snapshot().await;
        assert_eq!(state.alerts.len(), 6);
        assert!(state.alerts[0].is_new);

        // the random chain raises at least one more within 45 seconds
        tokio::time::sleep(Duration::from_secs(43)).await;
        assert!(service.snapshot().await.alerts.len() >= 7);
        generator.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn test_generator_keeps_latest_twenty() {
        let service = seeded();
        let generator = service.spawn_generator(AlertSchedule {
            first_after: Duration::from_secs(1),
            min_interval: Duration::from_secs(2),
            max_interval: Duration::from_secs(2),
        });

        tokio::time::sleep(Duration::from_secs(60)).await;
        let state = service.snapshot().await;
        assert_eq!(state.alerts.len(), 20);
        assert!(state.last_alert_id > 25);
        generator.abort();
    }

    #[test]
    fn test_interval_within_bounds() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let interval = pick_interval(&mut rng, &schedule());
            assert!(interval >= Duration::from_secs(15) && interval <= Duration::from_secs(45));
        }
    }
}
