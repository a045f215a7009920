use lazy_static::lazy_static;
use ratatui::style::Color;

use crate::config::ColorBand;

pub const DEFAULT_FLOOR_DB: f32 = -60.0;
pub const DEFAULT_CEILING_DB: f32 = 0.0;
pub const DEFAULT_SEGMENTS: usize = 30;
/// Hold marker fall speed in units per second.
pub const DEFAULT_DECAY_RATE: f32 = 20.0;

pub const YELLOW_START_DB: f32 = -12.0;
pub const RED_START_DB: f32 = -3.0;

pub const DEFAULT_SCALE_STEPS: [f32; 4] = [5.0, 10.0, 20.0, 50.0];
pub const DEFAULT_UNIT: &str = "dBFS";

/// Growth factor applied to the fall smoothing amount on consecutive falling updates.
pub const FALL_SMOOTHING_GROWTH: f32 = 1.10;

lazy_static! {
    pub static ref DEFAULT_BANDS: Vec<ColorBand> = vec![
        ColorBand::new(f32::NEG_INFINITY, Color::Green),
        ColorBand::new(YELLOW_START_DB, Color::Yellow),
        ColorBand::new(RED_START_DB, Color::Red),
    ];
}
