use std::time::{Duration, Instant};

use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, BorderType, Borders, Paragraph},
    DefaultTerminal, Frame,
};

use rataudio_dpm::{amplitude_to_db, DigitalMeter, DisplayConfig, MeterWidget, Orientation, Scale};

fn main() -> Result<()> {
    color_eyre::install()?;
    let terminal = ratatui::init();
    let result = run(terminal);
    ratatui::restore();
    result
}

fn generate_levels(steps: usize) -> Vec<f32> {
    (0..steps)
        .map(|i| {
            let phase = i as f32 / steps as f32 * std::f32::consts::TAU;
            let normalized = phase.sin() * 0.5 + 0.5;
            -66.0 + normalized * 68.0
        })
        .collect()
}

fn run(mut terminal: DefaultTerminal) -> Result<()> {
    const UPDATE_INTERVAL: Duration = Duration::from_millis(33);

    let mut stereo = DigitalMeter::new(
        2,
        DisplayConfig::default()
            .with_range(-70.0, 0.0)
            .with_segments(35)
            .with_scale(Scale::Iec)
            .with_hold_time(Duration::from_millis(500)),
    )?;
    let mut mono = DigitalMeter::new(
        1,
        DisplayConfig::default()
            .with_orientation(Orientation::Horizontal)
            .with_fall_smoothing(0.5),
    )?;

    let levels = generate_levels(100);
    let mut index = [0, 37];
    let mut rng = rand::rng();
    let mut last_update = Instant::now();

    loop {
        if last_update.elapsed() >= UPDATE_INTERVAL {
            let jitter = |rng: &mut rand::rngs::ThreadRng| rng.random_range(-4.0..4.0);
            stereo.set_reading(&[
                levels[index[0]] + jitter(&mut rng),
                levels[index[1]] + jitter(&mut rng),
            ])?;
            mono.set_reading(&[amplitude_to_db(rng.random_range(0.0..1.0))])?;
            index[0] = (index[0] + 1) % levels.len();
            index[1] = (index[1] + 3) % levels.len();
            last_update = Instant::now();
        }

        let now = Instant::now();
        let repaint = stereo.tick(now) | mono.tick(now);
        if repaint {
            terminal.draw(|frame| draw(frame, &stereo, &mono))?;
        }
        if handle_input()? == Command::Quit {
            break Ok(());
        }
    }
}

fn draw(frame: &mut Frame, stereo: &DigitalMeter, mono: &DigitalMeter) {
    let [title_area, body] =
        Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(frame.area());
    let title = Paragraph::new("Digital Peak Meter Demo (q to quit)")
        .style(Style::default().fg(Color::Yellow))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded),
        )
        .alignment(Alignment::Center);
    frame.render_widget(title, title_area);

    let [stereo_area, mono_area] =
        Layout::horizontal([Constraint::Length(16), Constraint::Fill(1)]).areas(body);

    frame.render_widget(
        MeterWidget::new(stereo).block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title("IEC"),
        ),
        stereo_area,
    );

    let mono_area = Rect {
        height: mono_area.height.min(4),
        ..mono_area
    };
    frame.render_widget(
        MeterWidget::new(mono).block(
            Block::bordered()
                .border_type(BorderType::Rounded)
                .title("Linear"),
        ),
        mono_area,
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Noop,
    Quit,
}

fn handle_input() -> Result<Command> {
    if !event::poll(Duration::from_secs_f64(1.0 / 60.0))? {
        return Ok(Command::Noop);
    }
    match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') => Ok(Command::Quit),
            _ => Ok(Command::Noop),
        },
        _ => Ok(Command::Noop),
    }
}
