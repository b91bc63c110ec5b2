//! Transform view: apply rotation, filters, and format changes server-side.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, TransformForm};
use crate::ui::styles;

use super::{form_column, render_button, render_form_message, render_text_field};

fn option_lines(form: &TransformForm) -> Vec<String> {
    vec![
        format!(
            "[{}] Resize: {}",
            if form.resize.is_some() { "x" } else { " " },
            form.resize
                .map(|r| format!("{}x{}", r.width, r.height))
                .unwrap_or_else(|| "off".to_string())
        ),
        format!(
            "[{}] Rotate: {}",
            if form.rotate.is_some() { "x" } else { " " },
            form.rotate
                .map(|d| format!("{} deg", d))
                .unwrap_or_else(|| "off".to_string())
        ),
        format!("[{}] Grayscale", if form.grayscale { "x" } else { " " }),
        format!("[{}] Sepia", if form.sepia { "x" } else { " " }),
        format!(
            "[{}] Output format: {}",
            if form.format.is_some() { "x" } else { " " },
            form.format
                .map(|f| f.label().to_string())
                .unwrap_or_else(|| "keep".to_string())
        ),
    ]
}

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let column = form_column(area, 60);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),                                   // Heading
            Constraint::Length(3),                                   // Path
            Constraint::Length(TransformForm::OPTION_COUNT as u16 + 2), // Options
            Constraint::Length(1),                                   // Button
            Constraint::Length(2),                                   // Message
            Constraint::Length(2),                                   // Hint
            Constraint::Min(0),
        ])
        .split(column);

    frame.render_widget(
        Paragraph::new(Line::styled("Transform an image", styles::title_style())).centered(),
        chunks[0],
    );

    render_text_field(
        frame,
        chunks[1],
        "File path",
        &app.transform_form.path,
        app.focus_index == 0,
        false,
    );

    let options_focused = app.focus_index == 1;
    let items: Vec<ListItem> = option_lines(&app.transform_form)
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let style = if options_focused && i == app.transform_form.option_selection {
                styles::selected_style()
            } else {
                ratatui::style::Style::default()
            };
            ListItem::new(line).style(style)
        })
        .collect();

    let options_block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(options_focused))
        .title("Transformations");
    frame.render_widget(List::new(items).block(options_block), chunks[2]);

    render_button(frame, chunks[3], "Transform", app.focus_index == 2);
    render_form_message(frame, chunks[4], app.transform_form.error.as_deref(), None);

    frame.render_widget(
        Paragraph::new(Line::styled(
            "Up/Down to select, Space or Left/Right to toggle and adjust.",
            styles::muted_style(),
        ))
        .centered(),
        chunks[5],
    );
}
