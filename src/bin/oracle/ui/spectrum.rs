//! Spectrum widget
//!
//! Draws the engine's normalized frequency bins on a log-frequency axis.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    symbols,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
    Frame,
};

/// Lowest frequency shown. Bins below it are skipped.
const MIN_HZ: f64 = 20.0;

pub fn render_spectrum(frame: &mut Frame, area: Rect, bins: &[f32], sample_rate: f32) {
    let block = Block::default().title(" Spectrum ").borders(Borders::ALL);

    // Bin i of N covers i * nyquist / N.
    let nyquist = sample_rate as f64 / 2.0;
    let hz_per_bin = nyquist / bins.len().max(1) as f64;
    let data: Vec<(f64, f64)> = bins
        .iter()
        .enumerate()
        .filter_map(|(i, &level)| {
            let hz = i as f64 * hz_per_bin;
            (hz >= MIN_HZ).then(|| (hz.log10(), level as f64))
        })
        .collect();

    let dataset = Dataset::default()
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Green))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .bounds([MIN_HZ.log10(), nyquist.max(MIN_HZ * 10.0).log10()])
                .labels(vec!["20", "200", "2k", "20k"])
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, 1.0])
                .style(Style::default().fg(Color::DarkGray)),
        );

    frame.render_widget(chart, area);
}
