//! Voice activity meters

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{BarChart, Block, Borders},
    Frame,
};

use super::state::VoiceSnapshot;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

pub fn note_name(pitch: u8) -> String {
    let octave = pitch as i32 / 12 - 1;
    format!("{}{}", NOTE_NAMES[pitch as usize % 12], octave)
}

pub fn render_voices(frame: &mut Frame, area: Rect, snapshot: &VoiceSnapshot) {
    let labels: Vec<String> = snapshot
        .levels
        .iter()
        .zip(snapshot.pitches.iter())
        .map(|(&level, &pitch)| {
            if level > 0.0 {
                note_name(pitch)
            } else {
                "-".to_string()
            }
        })
        .collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(snapshot.levels.iter())
        .map(|(label, &level)| (label.as_str(), (level.clamp(0.0, 1.0) * 100.0) as u64))
        .collect();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(" Voices {}/{} ", snapshot.active, snapshot.levels.len()))
                .borders(Borders::ALL),
        )
        .bar_width(3)
        .bar_gap(1)
        .max(100)
        .bar_style(Style::default().fg(Color::Magenta))
        .value_style(Style::default().fg(Color::Black).bg(Color::Magenta))
        .data(&data);

    frame.render_widget(chart, area);
}
