//! Translation of channel levels into segment draw instructions.
//!
//! Nothing in here draws. [`MeterRenderer`] turns a [`LevelSnapshot`] and a
//! [`DisplayConfig`] into a flat list of [`SegmentDraw`]s that a host paints
//! however it likes; see [`MeterWidget`](crate::MeterWidget) for the ratatui one.
use ratatui::style::Color;

use crate::config::DisplayConfig;
use crate::state::LevelSnapshot;

/// How a segment should be painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Part of the level bar.
    Filled,
    /// Above the level: only the empty track is drawn.
    Outline,
    /// The peak-hold marker, drawn thinner than a filled segment.
    Hold,
}

/// One draw instruction. Index 0 is the floor end of the bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentDraw {
    pub index: usize,
    pub color: Color,
    pub kind: SegmentKind,
}

/// A labelled tick beside the meter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleMark {
    /// Distance in cells from the ceiling end of the bar.
    pub offset: u16,
    pub level: f32,
}

pub struct MeterRenderer {}

impl MeterRenderer {
    /// Segments lit at `position` (in segment units) on a bar of `segments` segments.
    ///
    /// Halves round up, so a level exactly between two segment edges lights the
    /// upper segment.
    pub fn lit_segments(position: f64, segments: usize) -> usize {
        let lit = (position.clamp(0.0, segments as f64) + 0.5).floor();
        (lit as usize).min(segments)
    }

    /// Segments lit by `value` under `config`.
    pub fn lit_for(value: f32, config: &DisplayConfig) -> usize {
        let position =
            config
                .scale
                .segment_position(value, config.floor, config.ceiling, config.segments);
        Self::lit_segments(position, config.segments)
    }

    /// Colour of a segment, taken from the level at the middle of its range.
    pub fn segment_color(index: usize, config: &DisplayConfig) -> Color {
        let middle = (index as f32 + 0.5) / config.segments as f32;
        let level = config
            .scale
            .denormalize(middle, config.floor, config.ceiling);
        config.color_for(level)
    }

    /// Index of the segment carrying the hold marker, if one is shown.
    pub fn hold_segment(snapshot: &LevelSnapshot, config: &DisplayConfig) -> Option<usize> {
        if !config.show_hold {
            return None;
        }
        Self::lit_for(snapshot.hold, config).checked_sub(1)
    }

    /// Draw instructions for one channel.
    ///
    /// Every segment is emitted once, floor end first, as [`SegmentKind::Filled`]
    /// or [`SegmentKind::Outline`]. The hold marker, when visible, follows as one
    /// extra [`SegmentKind::Hold`] instruction.
    pub fn render(snapshot: &LevelSnapshot, config: &DisplayConfig) -> Vec<SegmentDraw> {
        let lit = Self::lit_for(snapshot.current, config);

        let mut draws: Vec<SegmentDraw> = (0..config.segments)
            .map(|index| SegmentDraw {
                index,
                color: Self::segment_color(index, config),
                kind: if index < lit {
                    SegmentKind::Filled
                } else {
                    SegmentKind::Outline
                },
            })
            .collect();

        if let Some(index) = Self::hold_segment(snapshot, config) {
            draws.push(SegmentDraw {
                index,
                color: Self::segment_color(index, config),
                kind: SegmentKind::Hold,
            });
        }
        draws
    }

    /// Scale marks for a bar `length` cells long, at least `min_spacing` cells apart.
    ///
    /// The first mark is the ceiling. Each following mark uses the smallest of
    /// `config.scale_steps` that lands far enough below the previous one.
    /// There is never more than one mark per cell.
    pub fn scale_marks(config: &DisplayConfig, length: u16, min_spacing: f32) -> Vec<ScaleMark> {
        let max_marks = usize::from(length) + 1;
        let length = f32::from(length);
        let position = |level: f32| length - config.normalize(level) * length;

        let mut marks = vec![ScaleMark {
            offset: 0,
            level: config.ceiling,
        }];
        if config.scale_steps.is_empty() {
            return marks;
        }

        let mut level = config.ceiling;
        let mut offset = 0.0;
        while offset < length - min_spacing && marks.len() < max_marks {
            let previous_level = level;
            let required = offset + min_spacing;
            for step in &config.scale_steps {
                level = previous_level - step;
                offset = position(level);
                if offset > required {
                    break;
                }
            }
            // Steps too small to move an f32 level end the scale.
            if level <= config.floor || level >= previous_level {
                break;
            }
            if offset < length - min_spacing {
                marks.push(ScaleMark {
                    offset: offset.ceil() as u16,
                    level,
                });
            }
        }
        marks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaling::Scale;

    fn config(segments: usize) -> DisplayConfig {
        DisplayConfig::default()
            .with_range(-60.0, 0.0)
            .with_segments(segments)
    }

    fn snapshot(current: f32, hold: f32) -> LevelSnapshot {
        LevelSnapshot { current, hold }
    }

    fn filled(draws: &[SegmentDraw]) -> usize {
        draws
            .iter()
            .filter(|draw| draw.kind == SegmentKind::Filled)
            .count()
    }

    #[test]
    fn reading_at_thirty_percent_lights_three_of_ten() {
        let draws = MeterRenderer::render(&snapshot(-42.0, -42.0), &config(10));
        assert_eq!(filled(&draws), 3);
        assert!(draws[..3].iter().all(|d| d.kind == SegmentKind::Filled));
        assert!(draws[3..10].iter().all(|d| d.kind == SegmentKind::Outline));
    }

    #[test]
    fn half_segment_rounds_up() {
        // -57 is halfway through the first segment of ten.
        assert_eq!(MeterRenderer::lit_segments(0.5, 10), 1);
        assert_eq!(MeterRenderer::lit_segments(0.49, 10), 0);
        let draws = MeterRenderer::render(&snapshot(-57.0, -57.0), &config(10));
        assert_eq!(filled(&draws), 1);
    }

    #[test]
    fn half_boundaries_round_up_for_every_segment_count() {
        for segments in 1..=64usize {
            let cfg = config(segments);
            for index in 0..segments {
                // Level halfway through segment `index`, kept only when f32 holds it exactly.
                let level = -60.0 + (2 * index + 1) as f64 * 30.0 / segments as f64;
                if f64::from(level as f32) != level {
                    continue;
                }
                assert_eq!(
                    MeterRenderer::lit_for(level as f32, &cfg),
                    index + 1,
                    "{segments} segments, level {level}"
                );
            }
        }
        assert_eq!(MeterRenderer::lit_for(-25.0, &config(54)), 32);
        assert_eq!(MeterRenderer::lit_for(-28.5, &config(60)), 32);
    }

    #[test]
    fn bounds_light_nothing_or_everything() {
        let cfg = config(10);
        assert_eq!(filled(&MeterRenderer::render(&snapshot(-60.0, -60.0), &cfg)), 0);
        assert_eq!(filled(&MeterRenderer::render(&snapshot(0.0, 0.0), &cfg)), 10);
        assert_eq!(MeterRenderer::lit_segments(15.0, 10), 10);
        assert_eq!(MeterRenderer::lit_segments(-5.0, 10), 0);
    }

    #[test]
    fn segments_are_emitted_in_order_with_hold_last() {
        let draws = MeterRenderer::render(&snapshot(-42.0, -12.0), &config(10));
        assert_eq!(draws.len(), 11);
        for (position, draw) in draws[..10].iter().enumerate() {
            assert_eq!(draw.index, position);
        }
        let hold = draws[10];
        assert_eq!(hold.kind, SegmentKind::Hold);
        assert_eq!(hold.index, 7);
    }

    #[test]
    fn hold_marker_hidden_when_disabled_or_at_floor() {
        let cfg = config(10).with_hold_visible(false);
        let draws = MeterRenderer::render(&snapshot(-42.0, -12.0), &cfg);
        assert!(draws.iter().all(|d| d.kind != SegmentKind::Hold));

        let draws = MeterRenderer::render(&snapshot(-60.0, -60.0), &config(10));
        assert!(draws.iter().all(|d| d.kind != SegmentKind::Hold));
    }

    #[test]
    fn colours_follow_level_bands() {
        let draws = MeterRenderer::render(&snapshot(0.0, 0.0), &config(10));
        assert_eq!(draws[0].color, Color::Green);
        assert_eq!(draws[7].color, Color::Green);
        assert_eq!(draws[8].color, Color::Yellow);
        assert_eq!(draws[9].color, Color::Red);
    }

    #[test]
    fn colours_stay_with_level_when_segment_count_changes() {
        // The segment covering -1 dB is red regardless of resolution.
        for segments in [10, 20, 60] {
            let cfg = config(segments);
            assert_eq!(MeterRenderer::segment_color(segments - 1, &cfg), Color::Red);
            assert_eq!(MeterRenderer::segment_color(0, &cfg), Color::Green);
        }
    }

    #[test]
    fn render_is_deterministic() {
        let cfg = config(24).with_scale(Scale::Iec);
        let snap = snapshot(-18.0, -4.0);
        assert_eq!(
            MeterRenderer::render(&snap, &cfg),
            MeterRenderer::render(&snap, &cfg)
        );
    }

    #[test]
    fn scale_marks_start_at_ceiling_and_descend() {
        let marks = MeterRenderer::scale_marks(&config(10), 60, 2.0);
        assert_eq!(marks[0], ScaleMark { offset: 0, level: 0.0 });
        assert_eq!(marks[1].level, -5.0);
        assert_eq!(marks.last().map(|m| m.level), Some(-55.0));
        for pair in marks.windows(2) {
            assert!(pair[1].level < pair[0].level);
            assert!(pair[1].offset > pair[0].offset);
        }
        assert!(marks.iter().all(|m| m.level > -60.0));
    }

    #[test]
    fn scale_marks_widen_steps_on_short_bars() {
        let marks = MeterRenderer::scale_marks(&config(10), 12, 2.0);
        assert_eq!(marks[1].level, -20.0);
        for pair in marks.windows(2) {
            assert!(pair[1].offset - pair[0].offset >= 2);
        }
    }

    #[test]
    fn scale_marks_end_on_vanishing_steps() {
        let cfg = config(10).with_scale_steps(vec![1e-6]);
        let marks = MeterRenderer::scale_marks(&cfg, 40, 2.0);
        assert!(marks.len() <= 41);
        assert_eq!(marks[0].level, 0.0);

        // -10 minus 1e-9 is still -10 in f32.
        let cfg = config(10)
            .with_range(-60.0, -10.0)
            .with_scale_steps(vec![1e-9]);
        let marks = MeterRenderer::scale_marks(&cfg, 40, 2.0);
        assert_eq!(marks, vec![ScaleMark { offset: 0, level: -10.0 }]);
    }
}
