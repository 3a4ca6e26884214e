// Playback clock and the dashboard date state it drives
use crate::domain::errors::DomainError;
use crate::domain::time_window::{floor_to_hour, TimeWindow, WindowBounds};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum PlaybackSpeed {
    #[default]
    X1,
    X2,
    X4,
}

impl PlaybackSpeed {
    pub fn multiplier(&self) -> u8 {
        match self {
            PlaybackSpeed::X1 => 1,
            PlaybackSpeed::X2 => 2,
            PlaybackSpeed::X4 => 4,
        }
    }

    /// Wall time between ticks: one second divided by the multiplier
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(1000 / self.multiplier() as u64)
    }
}

impl TryFrom<u8> for PlaybackSpeed {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PlaybackSpeed::X1),
            2 => Ok(PlaybackSpeed::X2),
            4 => Ok(PlaybackSpeed::X4),
            other => Err(DomainError::InvalidSpeed(other)),
        }
    }
}

impl From<PlaybackSpeed> for u8 {
    fn from(speed: PlaybackSpeed) -> Self {
        speed.multiplier()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClockState {
    #[default]
    Stopped,
    Running,
}

/// Stopped/Running state plus the speed used on the next (or current) run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackClock {
    pub state: ClockState,
    pub speed: PlaybackSpeed,
}

/// Result of one clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Advanced(DateTime<Utc>),
    Stopped,
}

impl PlaybackClock {
    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    pub fn play(&mut self) {
        self.state = ClockState::Running;
    }

    pub fn pause(&mut self) {
        self.state = ClockState::Stopped;
    }

    pub fn set_speed(&mut self, speed: PlaybackSpeed) {
        self.speed = speed;
    }

    /// Advance `current` by one hour, floored to the top of the hour.
    /// Past `max` the clock stops instead and `current` is kept.
    pub fn tick(&mut self, current: DateTime<Utc>, max: DateTime<Utc>) -> TickOutcome {
        let next = floor_to_hour(current + TimeDelta::hours(1));
        if next <= max {
            TickOutcome::Advanced(next)
        } else {
            self.pause();
            TickOutcome::Stopped
        }
    }
}

/// Named, serializable changes to [`DateState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DateIntent {
    SetDate { date: DateTime<Utc> },
    SetRange { start: DateTime<Utc>, end: DateTime<Utc> },
    SetRangeMode { enabled: bool },
    Play,
    Pause,
    SetSpeed { speed: PlaybackSpeed },
    AdvanceTime,
}

/// Dashboard time selection and playback
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateState {
    pub window: TimeWindow,
    pub clock: PlaybackClock,
    pub bounds: WindowBounds,
}

impl DateState {
    /// Single-instant selection at `now` floored to the hour
    pub fn new(now: DateTime<Utc>, window_days: i64) -> Self {
        Self {
            window: TimeWindow::Single {
                at: floor_to_hour(now),
            },
            clock: PlaybackClock::default(),
            bounds: WindowBounds::around(now, window_days),
        }
    }

    pub fn is_playing(&self) -> bool {
        self.clock.is_running()
    }

    pub fn reduce(&mut self, intent: DateIntent) {
        match intent {
            DateIntent::SetDate { date } => {
                let at = date.clamp(self.bounds.min, self.bounds.max);
                self.window = TimeWindow::Single { at };
            }
            DateIntent::SetRange { start, end } => {
                self.window = TimeWindow::Range { start, end };
                self.clock.pause();
            }
            DateIntent::SetRangeMode { enabled } => self.set_range_mode(enabled),
            DateIntent::Play => self.clock.play(),
            DateIntent::Pause => self.clock.pause(),
            DateIntent::SetSpeed { speed } => self.clock.set_speed(speed),
            DateIntent::AdvanceTime => self.advance(),
        }
    }

    fn set_range_mode(&mut self, enabled: bool) {
        self.window = match (enabled, self.window) {
            (true, TimeWindow::Single { at }) => TimeWindow::Range { start: at, end: at },
            (false, TimeWindow::Range { start, .. }) => TimeWindow::Single { at: start },
            (_, unchanged) => unchanged,
        };
        if enabled {
            self.clock.pause();
        }
    }

    fn advance(&mut self) {
        let TimeWindow::Single { at } = self.window else {
            return;
        };
        if let TickOutcome::Advanced(next) = self.clock.tick(at, self.bounds.max) {
            self.window = TimeWindow::Single { at: next };
        }
    }
}

/// Date state plus the slider positions derived from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateView {
    #[serde(flatten)]
    pub state: DateState,
    pub hour_index: i64,
    pub percent: f64,
}

impl From<DateState> for DateView {
    fn from(state: DateState) -> Self {
        let leading = state.window.leading_edge();
        Self {
            state,
            hour_index: state.bounds.hour_index(leading),
            percent: state.bounds.percent_of(leading),
        }
    }
}

/// A slider drag, either as an hour index from `min` or as a percentage
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderPosition {
    #[serde(default)]
    pub hour_index: Option<i64>,
    #[serde(default)]
    pub percent: Option<f64>,
}

impl SliderPosition {
    /// The `SetDate` intent for this position, clamped into the bounds
    pub fn to_intent(&self, bounds: &WindowBounds) -> Option<DateIntent> {
        let date = match (self.hour_index, self.percent) {
            (Some(index), _) => bounds.instant_at_hour(index.clamp(0, bounds.total_hours())),
            (None, Some(percent)) => bounds.instant_at_percent(percent.clamp(0.0, 100.0)),
            (None, None) => return None,
        };
        Some(DateIntent::SetDate { date })
    }
}
