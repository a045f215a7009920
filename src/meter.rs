//! The [`DigitalMeter`] ties one [`LevelState`] per channel to a shared [`DisplayConfig`].
use std::time::Instant;

use log::{debug, trace, warn};

use crate::config::DisplayConfig;
use crate::error::{MeterError, Result};
use crate::rendering::{MeterRenderer, SegmentDraw};
use crate::state::{LevelSnapshot, LevelState, Phase};

/// Source of the current time for a meter.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock based on [`Instant::now`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A multi-channel digital peak meter.
///
/// Readings go in through [`set_reading`](DigitalMeter::set_reading), a host
/// timer drives [`tick`](DigitalMeter::tick) to let the hold markers decay, and
/// the paint callback asks for [`render`](DigitalMeter::render).
///
/// All calls are expected on one thread (usually the UI thread). Readings
/// produced elsewhere must be handed over through the host's own channel.
///
/// ```
/// use std::time::{Duration, Instant};
/// use rataudio_dpm::{DigitalMeter, DisplayConfig};
///
/// let mut meter = DigitalMeter::new(2, DisplayConfig::default()).unwrap();
/// meter.set_reading(&[-18.0, -6.0]).unwrap();
/// let repaint = meter.tick(Instant::now() + Duration::from_millis(16));
/// assert!(repaint);
/// assert_eq!(meter.render().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct DigitalMeter<C = SystemClock> {
    config: DisplayConfig,
    channels: Vec<LevelState>,
    clock: C,
    /// Set by changes that affect the whole meter, such as the channel count.
    dirty: bool,
}

impl DigitalMeter<SystemClock> {
    /// Create a meter with `channels` channels, all resting at the floor.
    pub fn new(channels: usize, config: DisplayConfig) -> Result<Self> {
        Self::with_clock(channels, config, SystemClock)
    }

    /// Create a single channel meter with the default configuration.
    pub fn mono() -> Self {
        Self::build(1, DisplayConfig::default(), SystemClock)
    }

    /// Create a two channel meter with the default configuration.
    pub fn stereo() -> Self {
        Self::build(2, DisplayConfig::default(), SystemClock)
    }
}

impl<C: Clock> DigitalMeter<C> {
    /// Create a meter reading time from `clock`.
    pub fn with_clock(channels: usize, config: DisplayConfig, clock: C) -> Result<Self> {
        check_channel_count(channels)?;
        config.validate()?;
        Ok(Self::build(channels, config, clock))
    }

    fn build(channels: usize, config: DisplayConfig, clock: C) -> Self {
        let now = clock.now();
        let channels = (0..channels)
            .map(|_| LevelState::new(&config, now))
            .collect();
        Self {
            config,
            channels,
            clock,
            dirty: true,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Apply one reading per channel.
    ///
    /// Fails with [`MeterError::ChannelCountMismatch`] without touching any
    /// channel if `values` does not have one entry per channel.
    pub fn set_reading(&mut self, values: &[f32]) -> Result<()> {
        self.check_len(values.len())?;
        let now = self.clock.now();
        for (channel, (state, &reading)) in self.channels.iter_mut().zip(values).enumerate() {
            let was_clipping = state.is_clipping();
            state.update(reading, &self.config, now);
            if state.is_clipping() && !was_clipping {
                trace!("channel {channel} clipping at {reading}");
            }
        }
        Ok(())
    }

    /// Place the hold markers at explicit levels instead of the tracked peaks.
    pub fn set_hold_reading(&mut self, values: &[f32]) -> Result<()> {
        self.check_len(values.len())?;
        let now = self.clock.now();
        for (state, &hold) in self.channels.iter_mut().zip(values) {
            state.set_hold(hold, &self.config, now);
        }
        Ok(())
    }

    /// Advance the decay of every channel to `now`.
    ///
    /// Returns `true` when the meter needs a repaint: a reading arrived since
    /// the last tick, the configuration or channel count changed, the meter
    /// was reset, or a hold marker moved to another segment.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut repaint = std::mem::take(&mut self.dirty);
        for state in &mut self.channels {
            let before = MeterRenderer::hold_segment(&state.snapshot(), &self.config);
            state.step_decay(&self.config, now);
            let after = MeterRenderer::hold_segment(&state.snapshot(), &self.config);
            repaint |= state.take_dirty() || before != after;
        }
        repaint
    }

    /// Draw instructions for every channel, in channel order.
    pub fn render(&self) -> Vec<Vec<SegmentDraw>> {
        self.channels
            .iter()
            .map(|state| MeterRenderer::render(&state.snapshot(), &self.config))
            .collect()
    }

    /// Replace the configuration.
    ///
    /// An invalid configuration is rejected and the current one stays active.
    /// Channel levels are clamped into the new range.
    pub fn configure(&mut self, config: DisplayConfig) -> Result<()> {
        if let Err(err) = config.validate() {
            warn!("rejected meter configuration: {err}");
            return Err(err);
        }
        debug!(
            "meter configured: range {}..{} {}, {} segments, decay {}/s",
            config.floor, config.ceiling, config.unit, config.segments, config.decay_rate
        );
        self.config = config;
        self.dirty = true;
        for state in &mut self.channels {
            state.clamp_to(&self.config);
        }
        Ok(())
    }

    /// Change the number of channels. New channels start at the floor.
    pub fn set_channels(&mut self, channels: usize) -> Result<()> {
        check_channel_count(channels)?;
        if channels != self.channels.len() {
            debug!("meter channels {} -> {channels}", self.channels.len());
            let now = self.clock.now();
            let config = &self.config;
            self.channels
                .resize_with(channels, || LevelState::new(config, now));
            self.dirty = true;
        }
        Ok(())
    }

    /// Drop every channel back to the floor and clear clipping.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        for state in &mut self.channels {
            state.reset(&self.config, now);
        }
        self.dirty = true;
    }

    pub fn snapshot(&self, channel: usize) -> Option<LevelSnapshot> {
        self.channels.get(channel).map(LevelState::snapshot)
    }

    pub fn snapshots(&self) -> Vec<LevelSnapshot> {
        self.channels.iter().map(LevelState::snapshot).collect()
    }

    pub fn phase(&self, channel: usize) -> Option<Phase> {
        self.channels.get(channel).map(LevelState::phase)
    }

    /// Whether the last reading of `channel` was above the ceiling.
    pub fn is_clipping(&self, channel: usize) -> bool {
        self.channels
            .get(channel)
            .is_some_and(LevelState::is_clipping)
    }

    fn check_len(&self, actual: usize) -> Result<()> {
        let expected = self.channels.len();
        if actual != expected {
            warn!("rejected {actual} readings for a {expected} channel meter");
            return Err(MeterError::ChannelCountMismatch { expected, actual });
        }
        Ok(())
    }
}

fn check_channel_count(channels: usize) -> Result<()> {
    if channels == 0 {
        return Err(MeterError::InvalidConfig(
            "a meter needs at least one channel".to_string(),
        ));
    }
    Ok(())
}
