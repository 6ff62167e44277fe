//! Field rendering for bound forms

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Draw one form field: label as block title, current buffer as content,
/// cursor on the active field, red border plus the primary error message
/// when the field is errored.
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    error: Option<&str>,
    is_active: bool,
    is_multiline: bool,
) {
    let value_style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let border_style = if error.is_some() {
        Style::default().fg(Color::Red)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let display_str = if value.is_empty() && !is_active {
        "(empty)".to_string()
    } else {
        value.to_string()
    };

    let cursor = if is_active { "▌" } else { "" };

    let mut lines: Vec<Line> = if is_multiline {
        display_str
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect()
    } else {
        vec![Line::from(Span::styled(display_str.clone(), value_style))]
    };

    if is_active {
        if let Some(last) = lines.last_mut() {
            last.spans
                .push(Span::styled(cursor, Style::default().fg(Color::Cyan)));
        } else {
            lines.push(Line::from(Span::styled(
                cursor,
                Style::default().fg(Color::Cyan),
            )));
        }
    }

    if let Some(message) = error {
        lines.push(Line::from(Span::styled(
            format!("✗ {message}"),
            Style::default().fg(Color::Red),
        )));
    }

    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(
        Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
        area,
    );
}
