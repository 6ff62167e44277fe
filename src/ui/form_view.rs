//! Whole-form rendering

use super::binding::FormBinding;
use super::field_renderer::draw_field;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Draw a bound form: one block per field, a status line underneath.
///
/// The outer block title carries the dirty/valid markers so the derived
/// state is visible at a glance while editing.
pub fn draw_form(
    frame: &mut Frame,
    area: Rect,
    binding: &FormBinding,
    title: &str,
    status: Option<&str>,
) {
    let state = binding.state();

    let marker = match (state.is_dirty, state.is_valid) {
        (true, true) => " [modified, valid]",
        (true, false) => " [modified]",
        (false, true) => " [valid]",
        (false, false) => "",
    };
    let outer = Block::default()
        .title(format!(" {title}{marker} "))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = outer.inner(area);
    frame.render_widget(outer, area);

    let mut constraints: Vec<Constraint> = binding
        .specs()
        .iter()
        .map(|spec| {
            if spec.multiline {
                Constraint::Min(5)
            } else {
                Constraint::Length(4)
            }
        })
        .collect();
    constraints.push(Constraint::Length(2)); // status line

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .margin(1)
        .split(inner);

    for (index, spec) in binding.specs().iter().enumerate() {
        draw_field(
            frame,
            chunks[index],
            &spec.label,
            binding.buffer(index),
            state.errors.first(&spec.key),
            index == binding.active_index(),
            spec.multiline,
        );
    }

    let status_line = match status {
        Some(message) => Line::from(Span::styled(
            message.to_string(),
            Style::default().fg(Color::Yellow),
        )),
        None => Line::from(Span::styled(
            "Tab next field · Enter submit · Ctrl+R reset · Esc quit",
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(
        Paragraph::new(status_line),
        chunks[binding.specs().len()],
    );
}
