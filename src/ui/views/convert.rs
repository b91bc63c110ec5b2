//! Convert view: change an image's format server-side.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::{form_column, render_button, render_form_message, render_text_field};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let column = form_column(area, 60);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Heading
            Constraint::Length(3), // Path
            Constraint::Length(3), // Format selector
            Constraint::Length(1), // Button
            Constraint::Length(2), // Message
            Constraint::Length(2), // Hint
            Constraint::Min(0),
        ])
        .split(column);

    frame.render_widget(
        Paragraph::new(Line::styled("Convert an image", styles::title_style())).centered(),
        chunks[0],
    );

    render_text_field(
        frame,
        chunks[1],
        "File path",
        &app.convert_form.path,
        app.focus_index == 0,
        false,
    );

    let format_block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(app.focus_index == 1))
        .title("Target format");
    frame.render_widget(
        Paragraph::new(Line::styled(
            format!("< {} >", app.convert_form.format.label()),
            styles::highlight_style(),
        ))
        .block(format_block),
        chunks[2],
    );

    render_button(frame, chunks[3], "Convert", app.focus_index == 2);
    render_form_message(frame, chunks[4], app.convert_form.error.as_deref(), None);

    frame.render_widget(
        Paragraph::new(Line::styled(
            "Left/Right to change format. Output saved next to the input file.",
            styles::muted_style(),
        ))
        .centered(),
        chunks[5],
    );
}
