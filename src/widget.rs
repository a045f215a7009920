//! Paints a [`DigitalMeter`] into a ratatui [`Buffer`].
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    prelude::{symbols, BlockExt, Buffer, Color, Widget},
    style::Style,
    widgets::{Block, Paragraph},
};

use crate::config::{DisplayConfig, Orientation};
use crate::meter::{Clock, DigitalMeter, SystemClock};
use crate::rendering::{MeterRenderer, SegmentDraw, SegmentKind};

const TRACK_COLOR: Color = Color::DarkGray;
const CLIP_COLOR: Color = Color::Red;
/// Minimum rows between two scale labels of a vertical meter.
const VERTICAL_LABEL_SPACING: f32 = 2.0;

/// A widget to display a [`DigitalMeter`].
///
/// Vertical meters place the channels side by side with the scale on the
/// right. Horizontal meters stack one row per channel with the scale below.
/// A small indicator at the ceiling end of each channel turns red while the
/// channel is clipping.
///
/// The widget only reads the meter. Drive [`DigitalMeter::tick`] from the
/// application's event loop to animate the hold markers.
#[derive(Debug, Clone)]
pub struct MeterWidget<'a, C = SystemClock> {
    meter: &'a DigitalMeter<C>,
    block: Option<Block<'a>>,
    show_scale: bool,
}

impl<'a, C: Clock> MeterWidget<'a, C> {
    pub fn new(meter: &'a DigitalMeter<C>) -> Self {
        Self {
            meter,
            block: None,
            show_scale: true,
        }
    }

    /// Surround the meter with a [`Block`].
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    /// Show or hide the level scale and unit.
    #[must_use = "method moves the value of self and returns the modified value"]
    pub fn show_scale(mut self, show_scale: bool) -> Self {
        self.show_scale = show_scale;
        self
    }
}

impl<C: Clock> Widget for MeterWidget<'_, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl<C: Clock> Widget for &MeterWidget<'_, C> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(block) = self.block.as_ref() {
            block.render(area, buf);
        }

        let meter_area = self.block.inner_if_some(area);
        if meter_area.is_empty() {
            return;
        }

        let frames = self.meter.render();
        let clipping: Vec<bool> = (0..frames.len())
            .map(|channel| self.meter.is_clipping(channel))
            .collect();
        let config = self.meter.config();

        match config.orientation {
            Orientation::Vertical => render_vertical(
                config,
                &frames,
                &clipping,
                self.show_scale,
                meter_area,
                buf,
            ),
            Orientation::Horizontal => render_horizontal(
                config,
                &frames,
                &clipping,
                self.show_scale,
                meter_area,
                buf,
            ),
        }
    }
}

fn render_vertical(
    config: &DisplayConfig,
    frames: &[Vec<SegmentDraw>],
    clipping: &[bool],
    show_scale: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    // Bars need a column per channel plus the gaps between them before the
    // scale gets any room.
    let bars_width = (frames.len() * 2).saturating_sub(1) as u16;
    let show_scale = show_scale && area.width >= scale_width(config).saturating_add(bars_width);
    let scale_width = if show_scale { scale_width(config) } else { 0 };
    let [bars_area, scale_area] =
        Layout::horizontal([Constraint::Fill(1), Constraint::Length(scale_width)]).areas(area);

    // One row for the clip indicators, the rest for the segments.
    let [clip_row, track_area] =
        Layout::vertical([Constraint::Length(1), Constraint::Fill(1)]).areas(bars_area);
    if track_area.is_empty() {
        return;
    }

    let columns = Layout::horizontal(vec![Constraint::Fill(1); frames.len()])
        .spacing(1)
        .split(track_area);

    for (channel, (draws, column)) in frames.iter().zip(columns.iter()).enumerate() {
        let clip_cell = Rect::new(column.x, clip_row.y, column.width, 1);
        paint_clip(clip_cell, clipping[channel], buf);

        let length = column.height;
        paint_segments(config, length, draws, buf, |cell| {
            Rect::new(column.x, column.bottom() - 1 - cell, column.width, 1)
        });
    }

    if show_scale && !scale_area.is_empty() {
        // Marks line up with the segment track, one row below the clip indicators.
        let length = track_area.height;
        for mark in MeterRenderer::scale_marks(config, length, VERTICAL_LABEL_SPACING) {
            let y = track_area.y + mark.offset;
            if y + 1 >= track_area.bottom() {
                continue;
            }
            Paragraph::new(format!("{}", mark.level))
                .alignment(Alignment::Right)
                .render(Rect::new(scale_area.x, y, scale_area.width, 1), buf);
        }
        let unit_row = Rect::new(scale_area.x, scale_area.bottom() - 1, scale_area.width, 1);
        Paragraph::new(config.unit.as_str())
            .alignment(Alignment::Right)
            .render(unit_row, buf);
    }
}

fn render_horizontal(
    config: &DisplayConfig,
    frames: &[Vec<SegmentDraw>],
    clipping: &[bool],
    show_scale: bool,
    area: Rect,
    buf: &mut Buffer,
) {
    let mut constraints = vec![Constraint::Length(1); frames.len()];
    if show_scale {
        constraints.push(Constraint::Length(1));
    }
    let rows = Layout::vertical(constraints).split(area);

    // Last column of every row is the clip indicator.
    let track_width = area.width.saturating_sub(1);
    if track_width == 0 {
        return;
    }

    for (channel, draws) in frames.iter().enumerate() {
        let row = rows[channel];
        if row.is_empty() {
            continue;
        }
        let clip_cell = Rect::new(row.x + track_width, row.y, 1, 1);
        paint_clip(clip_cell, clipping[channel], buf);

        paint_segments(config, track_width, draws, buf, |cell| {
            Rect::new(row.x + cell, row.y, 1, 1)
        });
    }

    if show_scale {
        let scale_row = rows[frames.len()];
        if scale_row.is_empty() {
            return;
        }
        let spacing = f32::from(scale_width(config)) + 1.0;
        let right = scale_row.x + track_width;
        for mark in MeterRenderer::scale_marks(config, track_width, spacing) {
            let text = format!("{}", mark.level);
            let width = text.chars().count() as u16;
            let x = (right - mark.offset)
                .saturating_sub(width / 2)
                .clamp(scale_row.x, right.saturating_sub(width).max(scale_row.x));
            let width = width.min(scale_row.right().saturating_sub(x));
            if width == 0 {
                continue;
            }
            Paragraph::new(text).render(Rect::new(x, scale_row.y, width, 1), buf);
        }
    }
}

/// Paint one channel's draw list along a track of `length` cells.
///
/// `cell_rect` maps a cell index, counted from the floor end, to its area.
/// Segments sharing a cell on short tracks resolve in favour of the lit one.
fn paint_segments(
    config: &DisplayConfig,
    length: u16,
    draws: &[SegmentDraw],
    buf: &mut Buffer,
    cell_rect: impl Fn(u16) -> Rect,
) {
    let segments = config.segments;
    let horizontal = config.orientation == Orientation::Horizontal;
    let span = |index: usize| {
        let start = index * length as usize / segments;
        let end = ((index + 1) * length as usize / segments).max(start + 1);
        (start as u16)..(end.min(length as usize) as u16)
    };

    for kind in [SegmentKind::Outline, SegmentKind::Filled, SegmentKind::Hold] {
        for draw in draws.iter().filter(|draw| draw.kind == kind) {
            let cells = span(draw.index);
            let cells = if kind == SegmentKind::Hold {
                cells.end.saturating_sub(1)..cells.end
            } else {
                cells
            };
            for cell in cells {
                let rect = cell_rect(cell);
                let (symbol, color) = match kind {
                    SegmentKind::Filled if horizontal => (symbols::block::SEVEN_EIGHTHS, draw.color),
                    SegmentKind::Filled => (symbols::bar::SEVEN_EIGHTHS, draw.color),
                    SegmentKind::Outline => ("·", TRACK_COLOR),
                    SegmentKind::Hold if horizontal => (symbols::line::THICK_VERTICAL, draw.color),
                    SegmentKind::Hold => (symbols::line::THICK_HORIZONTAL, draw.color),
                };
                buf.set_style(rect, Style::default().fg(color));
                for x in rect.left()..rect.right() {
                    buf[(x, rect.y)].set_symbol(symbol);
                }
            }
        }
    }
}

fn paint_clip(cell: Rect, clipping: bool, buf: &mut Buffer) {
    let color = if clipping { CLIP_COLOR } else { TRACK_COLOR };
    for x in cell.left()..cell.right() {
        buf[(x, cell.y)]
            .set_symbol(symbols::block::FULL)
            .set_fg(color);
    }
}

/// Columns needed for the widest scale label or the unit.
fn scale_width(config: &DisplayConfig) -> u16 {
    let label = format!("{}", config.floor.round()).chars().count();
    let unit = config.unit.chars().count();
    label.max(unit) as u16 + 1
}
