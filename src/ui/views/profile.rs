//! Profile view: account details and password change.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::styles;
use crate::utils::format::age_display;

use super::{form_column, render_button, render_form_message, render_text_field};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let column = form_column(area, 50);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Identity
            Constraint::Length(2), // Heading
            Constraint::Length(3), // Current password
            Constraint::Length(3), // New password
            Constraint::Length(3), // Confirm
            Constraint::Length(1), // Button
            Constraint::Length(2), // Message
            Constraint::Min(0),
        ])
        .split(column);

    let identity = match (app.session.username(), app.session.last_revalidated()) {
        (Some(name), Some(when)) => {
            format!("Logged in as {} (verified {})", name, age_display(when))
        }
        (Some(name), None) => format!("Logged in as {}", name),
        _ => "Not logged in".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Line::styled(identity, styles::highlight_style())).centered(),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(Line::styled("Change password", styles::title_style())).centered(),
        chunks[1],
    );

    render_text_field(
        frame,
        chunks[2],
        "Current password",
        &app.profile_form.current,
        app.focus_index == 0,
        true,
    );
    render_text_field(
        frame,
        chunks[3],
        "New password",
        &app.profile_form.new,
        app.focus_index == 1,
        true,
    );
    render_text_field(
        frame,
        chunks[4],
        "Confirm new password",
        &app.profile_form.confirm,
        app.focus_index == 2,
        true,
    );
    render_button(frame, chunks[5], "Update password", app.focus_index == 3);
    render_form_message(
        frame,
        chunks[6],
        app.profile_form.error.as_deref(),
        app.profile_form.success.as_deref(),
    );
}
