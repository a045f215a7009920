use std::time::Instant;

use crate::config::DisplayConfig;
use crate::constants::FALL_SMOOTHING_GROWTH;

/// What the hold marker of a channel is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A reading arrived since the last decay step.
    Rising,
    /// The hold marker is above the current level and falling.
    Decaying,
    /// The hold marker has caught up with the current level.
    Idle,
}

/// The values a renderer needs from one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSnapshot {
    pub current: f32,
    pub hold: f32,
}

/// Level and peak-hold state of one meter channel.
///
/// The current level follows readings immediately (unless fall smoothing is
/// configured). The hold level jumps up with every new peak and falls back
/// toward the current level at the configured decay rate as
/// [`step_decay`](LevelState::step_decay) is called.
///
/// The hold level is never below the current level, and it only falls inside
/// `step_decay`.
///
/// A `LevelState` is not synchronised. Readings produced on another thread
/// must be handed to the thread that owns the meter.
#[derive(Debug, Clone)]
pub struct LevelState {
    current: f32,
    hold: f32,
    last_update: Instant,
    peak_time: Instant,
    falling_updates: i32,
    clipping: bool,
    dirty: bool,
    phase: Phase,
}

impl LevelState {
    /// A channel resting at the floor of `config`.
    pub fn new(config: &DisplayConfig, now: Instant) -> Self {
        Self {
            current: config.floor,
            hold: config.floor,
            last_update: now,
            peak_time: now,
            falling_updates: 0,
            clipping: false,
            dirty: true,
            phase: Phase::Idle,
        }
    }

    /// Apply a new reading.
    ///
    /// Out of range readings are clamped to the display range. A reading above
    /// the ceiling flags the channel as clipping until the next in-range reading.
    pub fn update(&mut self, reading: f32, config: &DisplayConfig, now: Instant) {
        self.clipping = reading > config.ceiling;
        let reading = config.clamp(reading);

        self.current = if config.fall_smoothing > 0.0 && reading < self.current {
            let max_fall = config.fall_smoothing * FALL_SMOOTHING_GROWTH.powi(self.falling_updates);
            self.falling_updates = self.falling_updates.saturating_add(1);
            reading.max(self.current - max_fall)
        } else {
            self.falling_updates = 0;
            reading
        };

        if self.current > self.hold {
            self.hold = self.current;
            self.peak_time = now;
        }
        self.last_update = now;
        self.dirty = true;
        self.phase = Phase::Rising;
    }

    /// Place the hold marker at an explicit level.
    ///
    /// The level is clamped to the display range and raised to the current
    /// level if it is below it. Decay continues from there on later steps.
    pub fn set_hold(&mut self, hold: f32, config: &DisplayConfig, now: Instant) {
        self.hold = config.clamp(hold).max(self.current);
        self.peak_time = now;
        self.last_update = now;
        self.dirty = true;
        self.phase = Phase::Rising;
    }

    /// Let the hold marker fall for the time passed since the last update or step.
    ///
    /// Calling this twice with the same `now` changes nothing the second time.
    /// Returns `true` if the hold level moved.
    pub fn step_decay(&mut self, config: &DisplayConfig, now: Instant) -> bool {
        // A hold time reaching past the end of `Instant` holds forever.
        let elapsed = match self.peak_time.checked_add(config.hold_time) {
            Some(hold_end) => now
                .saturating_duration_since(self.last_update.max(hold_end))
                .as_secs_f32(),
            None => 0.0,
        };
        let previous = self.hold;

        if self.hold > self.current {
            self.hold = (self.hold - config.decay_rate * elapsed).max(self.current);
        }
        self.last_update = self.last_update.max(now);
        self.phase = if self.hold > self.current {
            Phase::Decaying
        } else {
            Phase::Idle
        };

        self.hold != previous
    }

    pub fn snapshot(&self) -> LevelSnapshot {
        LevelSnapshot {
            current: self.current,
            hold: self.hold,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_clipping(&self) -> bool {
        self.clipping
    }

    /// Return the channel to the floor and clear clipping.
    pub fn reset(&mut self, config: &DisplayConfig, now: Instant) {
        *self = Self::new(config, now);
    }

    /// Pull both levels into the range of a new config.
    pub fn clamp_to(&mut self, config: &DisplayConfig) {
        self.current = config.clamp(self.current);
        self.hold = config.clamp(self.hold).max(self.current);
        self.dirty = true;
    }

    /// Whether something changed since the last call, clearing the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}
