// Playback service - Owns the date state and its repeating tick
use crate::application::playback::{DateIntent, DateState};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};

#[derive(Clone)]
pub struct PlaybackService {
    state: Arc<RwLock<DateState>>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    updates: watch::Sender<DateState>,
}

impl PlaybackService {
    pub fn new(initial: DateState) -> Self {
        let (updates, _) = watch::channel(initial);
        Self {
            state: Arc::new(RwLock::new(initial)),
            ticker: Arc::new(Mutex::new(None)),
            updates,
        }
    }

    pub async fn snapshot(&self) -> DateState {
        *self.state.read().await
    }

    /// Receiver that observes every applied intent, ticks included
    pub fn subscribe(&self) -> watch::Receiver<DateState> {
        self.updates.subscribe()
    }

    /// Apply an intent and restart, stop or keep the ticker to match.
    ///
    /// Any pending ticker is aborted before a new one is spawned, so a clock
    /// never has more than one tick outstanding.
    pub async fn dispatch(&self, intent: DateIntent) -> DateState {
        let mut ticker = self.ticker.lock().await;

        let before = *self.state.read().await;
        let after = {
            let mut state = self.state.write().await;
            state.reduce(intent.clone());
            *state
        };
        self.updates.send_replace(after);

        let should_tick = after.is_playing() && !after.window.is_range();
        let speed_changed = before.clock.speed != after.clock.speed;
        let ticking = ticker.as_ref().is_some_and(|t| !t.is_finished());

        if !should_tick || speed_changed || !ticking {
            if let Some(handle) = ticker.take() {
                handle.abort();
            }
        }
        if should_tick && ticker.is_none() {
            tracing::debug!("Starting playback at {}x", after.clock.speed.multiplier());
            *ticker = Some(self.spawn_ticker(after));
        }

        after
    }

    fn spawn_ticker(&self, started: DateState) -> JoinHandle<()> {
        let state = self.state.clone();
        let updates = self.updates.clone();
        let period = started.clock.speed.tick_interval();

        tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            loop {
                interval.tick().await;
                let current = {
                    let mut state = state.write().await;
                    state.reduce(DateIntent::AdvanceTime);
                    *state
                };
                updates.send_replace(current);

                if !current.is_playing() || current.window.is_range() {
                    tracing::info!("Playback stopped at {:?}", current.window);
                    break;
                }
            }
        })
    }
}
