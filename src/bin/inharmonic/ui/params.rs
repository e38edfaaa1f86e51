//! Parameter panel

use inharmonic_dsp::params::{format_value, ParamInfo, PARAMETERS, PARAM_COUNT};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Continuous parameters move by this much per key press.
const FINE_STEP: f64 = 0.01;

/// Move a normalized value one notch. Stepped parameters land on their grid.
pub fn nudge(info: &ParamInfo, value: f64, direction: f64) -> f64 {
    let next = if info.step_count > 0 {
        let steps = info.step_count as f64;
        ((value * steps).round() + direction) / steps
    } else {
        value + direction * FINE_STEP
    };
    next.clamp(0.0, 1.0)
}

pub fn render_params(
    frame: &mut Frame,
    area: Rect,
    values: &[f64; PARAM_COUNT],
    selected: usize,
) {
    let items: Vec<ListItem> = PARAMETERS
        .iter()
        .zip(values.iter())
        .map(|(info, &value)| {
            ListItem::new(format!(
                "{:<16}{:>12}",
                info.title,
                format_value(info.id, value)
            ))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title(" Parameters ").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );

    let mut state = ListState::default().with_selected(Some(selected));
    frame.render_stateful_widget(list, area, &mut state);
}
