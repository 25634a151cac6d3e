//! Engine status panel

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use oracle_audio::{ambient::AmbientLayer, engine::DeviceState};

#[derive(Debug, Clone)]
pub struct Status {
    pub state: DeviceState,
    pub voices: usize,
    pub muted: bool,
    pub master: f32,
    pub layers: [bool; AmbientLayer::COUNT],
    pub time: f64,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            state: DeviceState::Uninitialized,
            voices: 0,
            muted: false,
            master: 0.0,
            layers: [false; AmbientLayer::COUNT],
            time: 0.0,
        }
    }
}

pub fn render_status(frame: &mut Frame, area: Rect, status: &Status) {
    let block = Block::default().title(" Oracle ").borders(Borders::ALL);

    let engine = match status.state {
        DeviceState::Uninitialized => Span::styled(
            "press any key to start audio",
            Style::default().fg(Color::Yellow),
        ),
        DeviceState::Running => Span::styled(
            format!("{:>7.1}s  {} voices", status.time, status.voices),
            Style::default().fg(Color::Green),
        ),
        DeviceState::Disposed => Span::styled("disposed", Style::default().fg(Color::Red)),
    };
    let volume = if status.muted {
        Span::styled("  MUTED", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
    } else {
        Span::raw(format!("  vol {:>3.0}%", status.master * 100.0))
    };

    let layers = AmbientLayer::ALL
        .iter()
        .zip(status.layers)
        .enumerate()
        .map(|(i, (layer, active))| {
            let style = if active {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            Span::styled(format!(" {}:{layer} ", i + 1), style)
        })
        .collect::<Vec<_>>();

    let text = vec![Line::from(vec![engine, volume]), Line::from(layers)];
    frame.render_widget(Paragraph::new(text).block(block), area);
}
