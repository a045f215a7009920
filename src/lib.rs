//! A digital peak meter for ratatui.
//!
//! The meter keeps a current level and a decaying peak-hold level per channel
//! ([`LevelState`]), turns them into segment draw instructions
//! ([`MeterRenderer`]) and paints those into a terminal ([`MeterWidget`]).
//! The first two know nothing about ratatui's layout or buffers, so any host
//! can drive a [`DigitalMeter`] and paint its [`SegmentDraw`]s itself.
mod config;
mod constants;
mod error;
mod meter;
mod rendering;
mod scaling;
mod state;
mod widget;

pub use config::{ColorBand, DisplayConfig, Orientation};
pub use error::{MeterError, Result};
pub use meter::{Clock, DigitalMeter, SystemClock};
pub use rendering::{MeterRenderer, ScaleMark, SegmentDraw, SegmentKind};
pub use scaling::{amplitude_to_db, Scale};
pub use state::{LevelSnapshot, LevelState, Phase};
pub use widget::MeterWidget;
