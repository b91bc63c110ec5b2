use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    Frame,
};

use crate::app::App;
use crate::ui::styles;

use super::{form_column, render_button, render_form_message, render_text_field};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let column = form_column(area, 50);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Heading
            Constraint::Length(3), // Username
            Constraint::Length(3), // Password
            Constraint::Length(1), // Button
            Constraint::Length(2), // Message
            Constraint::Min(0),
        ])
        .split(column);

    frame.render_widget(
        ratatui::widgets::Paragraph::new(Line::styled("Sign in", styles::title_style()))
            .centered(),
        chunks[0],
    );

    render_text_field(
        frame,
        chunks[1],
        "Username",
        &app.login_form.username,
        app.focus_index == 0,
        false,
    );
    render_text_field(
        frame,
        chunks[2],
        "Password",
        &app.login_form.password,
        app.focus_index == 1,
        true,
    );
    render_button(frame, chunks[3], "Log in", app.focus_index == 2);
    render_form_message(frame, chunks[4], app.login_form.error.as_deref(), None);
}
