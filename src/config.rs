//! Display parameters shared by every channel of a meter.
use std::time::Duration;

use ratatui::style::Color;

use crate::constants::{
    DEFAULT_BANDS, DEFAULT_CEILING_DB, DEFAULT_DECAY_RATE, DEFAULT_FLOOR_DB, DEFAULT_SCALE_STEPS,
    DEFAULT_SEGMENTS, DEFAULT_UNIT,
};
use crate::error::{MeterError, Result};
use crate::scaling::Scale;

/// Direction the meter bar grows in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    /// Segment 0 at the bottom.
    #[default]
    Vertical,
    /// Segment 0 at the left.
    Horizontal,
}

/// A colour used for every level at or above `from`, up to the next band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorBand {
    pub from: f32,
    pub color: Color,
}

impl ColorBand {
    pub const fn new(from: f32, color: Color) -> Self {
        Self { from, color }
    }
}

/// Configuration of a [`DigitalMeter`](crate::DigitalMeter).
///
/// A config is replaced as a whole through
/// [`DigitalMeter::configure`](crate::DigitalMeter::configure), never patched
/// field by field on a live meter. Build one with the `with_*` methods starting
/// from [`DisplayConfig::default`]:
///
/// ```
/// use rataudio_dpm::{DisplayConfig, Orientation};
///
/// let config = DisplayConfig::default()
///     .with_range(-70.0, 0.0)
///     .with_segments(20)
///     .with_orientation(Orientation::Horizontal);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub floor: f32,
    pub ceiling: f32,
    pub segments: usize,
    /// Ascending by `from`. Levels below the first band use the first band's colour.
    pub bands: Vec<ColorBand>,
    /// Units per second the hold marker falls toward the current level. Zero holds forever.
    pub decay_rate: f32,
    pub orientation: Orientation,
    pub show_hold: bool,
    pub scale: Scale,
    /// Candidate distances between scale marks, tried smallest first.
    pub scale_steps: Vec<f32>,
    pub unit: String,
    /// How long a new peak is held before it starts to decay.
    pub hold_time: Duration,
    /// Maximum fall of the current level per update, in units. Zero disables smoothing.
    pub fall_smoothing: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            floor: DEFAULT_FLOOR_DB,
            ceiling: DEFAULT_CEILING_DB,
            segments: DEFAULT_SEGMENTS,
            bands: DEFAULT_BANDS.to_vec(),
            decay_rate: DEFAULT_DECAY_RATE,
            orientation: Orientation::default(),
            show_hold: true,
            scale: Scale::default(),
            scale_steps: DEFAULT_SCALE_STEPS.to_vec(),
            unit: DEFAULT_UNIT.to_string(),
            hold_time: Duration::ZERO,
            fall_smoothing: 0.0,
        }
    }
}

impl DisplayConfig {
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_range(mut self, floor: f32, ceiling: f32) -> Self {
        self.floor = floor;
        self.ceiling = ceiling;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_bands(mut self, bands: Vec<ColorBand>) -> Self {
        self.bands = bands;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_decay_rate(mut self, decay_rate: f32) -> Self {
        self.decay_rate = decay_rate;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_hold_visible(mut self, show_hold: bool) -> Self {
        self.show_hold = show_hold;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_scale_steps(mut self, steps: Vec<f32>) -> Self {
        self.scale_steps = steps;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_hold_time(mut self, hold_time: Duration) -> Self {
        self.hold_time = hold_time;
        self
    }

    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn with_fall_smoothing(mut self, fall_smoothing: f32) -> Self {
        self.fall_smoothing = fall_smoothing;
        self
    }

    /// Check the config for values a meter cannot display.
    pub fn validate(&self) -> Result<()> {
        if !self.floor.is_finite() || !self.ceiling.is_finite() {
            return Err(invalid("floor and ceiling must be finite"));
        }
        if self.floor >= self.ceiling {
            return Err(invalid(format!(
                "floor ({}) must be below ceiling ({})",
                self.floor, self.ceiling
            )));
        }
        if self.segments < 1 {
            return Err(invalid("segment count must be at least 1"));
        }
        if !self.decay_rate.is_finite() || self.decay_rate < 0.0 {
            return Err(invalid(format!(
                "decay rate must be a non-negative number, got {}",
                self.decay_rate
            )));
        }
        if self.bands.is_empty() {
            return Err(invalid("at least one colour band is required"));
        }
        if self.bands.iter().any(|band| band.from.is_nan()) {
            return Err(invalid("colour band thresholds must be numbers"));
        }
        if self.bands.windows(2).any(|pair| pair[0].from > pair[1].from) {
            return Err(invalid("colour bands must be sorted by ascending threshold"));
        }
        if !self.scale.is_valid() {
            return Err(invalid(format!("unusable scale {:?}", self.scale)));
        }
        if self.scale_steps.is_empty()
            || self
                .scale_steps
                .iter()
                .any(|step| !step.is_finite() || *step <= 0.0)
        {
            return Err(invalid("scale steps must be a non-empty list of positive numbers"));
        }
        if !self.fall_smoothing.is_finite() || self.fall_smoothing < 0.0 {
            return Err(invalid(format!(
                "fall smoothing must be a non-negative number, got {}",
                self.fall_smoothing
            )));
        }
        Ok(())
    }

    /// Clamp a reading into `[floor, ceiling]`. NaN becomes the floor.
    pub fn clamp(&self, reading: f32) -> f32 {
        if reading.is_nan() {
            self.floor
        } else {
            reading.clamp(self.floor, self.ceiling)
        }
    }

    /// Fraction of the bar covered by `value`.
    pub fn normalize(&self, value: f32) -> f32 {
        self.scale.normalize(value, self.floor, self.ceiling)
    }

    /// Colour of the band containing `value`.
    pub fn color_for(&self, value: f32) -> Color {
        self.bands
            .iter()
            .rev()
            .find(|band| value >= band.from)
            .or_else(|| self.bands.first())
            .map_or(Color::Reset, |band| band.color)
    }
}

fn invalid(reason: impl Into<String>) -> MeterError {
    MeterError::InvalidConfig(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DisplayConfig::default().validate().is_ok());
    }

    #[test]
    fn rejects_inverted_range() {
        let config = DisplayConfig::default().with_range(0.0, -60.0);
        assert!(matches!(
            config.validate(),
            Err(MeterError::InvalidConfig(_))
        ));
        let config = DisplayConfig::default().with_range(-10.0, -10.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_segments() {
        let config = DisplayConfig::default().with_segments(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_decay_rate() {
        assert!(DisplayConfig::default()
            .with_decay_rate(-1.0)
            .validate()
            .is_err());
    }

    #[test]
    fn zero_decay_rate_is_valid() {
        assert!(DisplayConfig::default()
            .with_decay_rate(0.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn rejects_unsorted_or_empty_bands() {
        let unsorted = vec![
            ColorBand::new(-3.0, Color::Red),
            ColorBand::new(-12.0, Color::Yellow),
        ];
        assert!(DisplayConfig::default()
            .with_bands(unsorted)
            .validate()
            .is_err());
        assert!(DisplayConfig::default()
            .with_bands(Vec::new())
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_bad_scale_steps() {
        assert!(DisplayConfig::default()
            .with_scale_steps(Vec::new())
            .validate()
            .is_err());
        assert!(DisplayConfig::default()
            .with_scale_steps(vec![5.0, 0.0])
            .validate()
            .is_err());
    }

    #[test]
    fn rejects_bad_power_scale_and_smoothing() {
        assert!(DisplayConfig::default()
            .with_scale(Scale::Power(-1.0))
            .validate()
            .is_err());
        assert!(DisplayConfig::default()
            .with_fall_smoothing(-0.5)
            .validate()
            .is_err());
    }

    #[test]
    fn clamp_is_idempotent() {
        let config = DisplayConfig::default();
        for reading in [-500.0, -60.0, -42.0, 0.0, 6.0] {
            let once = config.clamp(reading);
            assert_eq!(config.clamp(once), once);
            assert!((config.floor..=config.ceiling).contains(&once));
        }
        assert_eq!(config.clamp(f32::NAN), config.floor);
    }

    #[test]
    fn color_lookup_uses_absolute_level() {
        let config = DisplayConfig::default();
        assert_eq!(config.color_for(-40.0), Color::Green);
        assert_eq!(config.color_for(-12.0), Color::Yellow);
        assert_eq!(config.color_for(-6.0), Color::Yellow);
        assert_eq!(config.color_for(-3.0), Color::Red);
        assert_eq!(config.color_for(0.0), Color::Red);
    }

    #[test]
    fn levels_below_first_band_use_first_colour() {
        let config = DisplayConfig::default().with_bands(vec![
            ColorBand::new(-20.0, Color::Blue),
            ColorBand::new(-6.0, Color::Magenta),
        ]);
        assert_eq!(config.color_for(-50.0), Color::Blue);
        assert_eq!(config.color_for(-1.0), Color::Magenta);
    }
}
