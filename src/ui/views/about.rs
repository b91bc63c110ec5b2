//! About view, visible whether or not a session is held.

use ratatui::{
    layout::Rect,
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, area: Rect, _app: &App) {
    let lines = vec![
        Line::styled("Pixelport", styles::title_style()),
        Line::raw(""),
        Line::raw("A terminal client for the Pixelport image service."),
        Line::raw("Upload images, convert between formats, and apply"),
        Line::raw("resizes, rotations, and filters without leaving the shell."),
        Line::raw(""),
        Line::styled(
            format!("Version {}", env!("CARGO_PKG_VERSION")),
            styles::muted_style(),
        ),
    ];

    frame.render_widget(Paragraph::new(lines).centered(), area);
}
