pub mod about;
pub mod convert;
pub mod home;
pub mod login;
pub mod profile;
pub mod register;
pub mod transform;

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::styles;

/// A bordered single-line text input, highlighted when focused.
pub(crate) fn render_text_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    masked: bool,
) {
    let shown = if masked {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused))
        .title(label);

    frame.render_widget(Paragraph::new(shown).block(block), area);
}

/// A centered submit button line.
pub(crate) fn render_button(frame: &mut Frame, area: Rect, label: &str, focused: bool) {
    let text = if focused {
        format!("> {} <", label)
    } else {
        format!("  {}  ", label)
    };
    let style = if focused {
        styles::selected_style()
    } else {
        styles::muted_style()
    };
    frame.render_widget(
        Paragraph::new(Line::styled(text, style)).centered(),
        area,
    );
}

/// An error or success message line below a form.
pub(crate) fn render_form_message(
    frame: &mut Frame,
    area: Rect,
    error: Option<&str>,
    success: Option<&str>,
) {
    if let Some(msg) = error {
        frame.render_widget(
            Paragraph::new(Line::styled(msg.to_string(), styles::error_style())).centered(),
            area,
        );
    } else if let Some(msg) = success {
        frame.render_widget(
            Paragraph::new(Line::styled(msg.to_string(), styles::success_style())).centered(),
            area,
        );
    }
}

/// A fixed-width column centered in `area`, used by the form views.
pub(crate) fn form_column(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(area);
    chunks[1]
}
