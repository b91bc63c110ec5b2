use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::{App, AppState};
use crate::route::View;

use super::styles;
use super::views::{about, convert, home, login, profile, register, transform};

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Nav tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_nav(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame);
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let title = "  Pixelport";
    let right = match app.session.username() {
        Some(name) => format!("{}  [F1] Help", name),
        None => "[F1] Help".to_string(),
    };

    let padding = area
        .width
        .saturating_sub(title.len() as u16 + right.len() as u16 + 4) as usize;

    let title_line = Line::from(vec![
        Span::styled(title, styles::title_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn nav_entries(app: &App) -> Vec<(&'static str, View)> {
    if app.session.is_authenticated() {
        vec![
            ("[F2] Library", View::Home),
            ("[F3] Convert", View::Convert),
            ("[F4] Transform", View::Transform),
            ("[F5] Profile", View::Profile),
            ("[F6] About", View::About),
        ]
    } else {
        vec![
            ("[F2] Login", View::Login),
            ("[F3] Register", View::Register),
            ("[F6] About", View::About),
        ]
    }
}

fn render_nav(frame: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    for (i, (label, view)) in nav_entries(app).iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        if app.view == *view {
            spans.push(Span::styled(*label, styles::tab_style(true)));
        } else {
            spans.push(Span::styled(*label, styles::muted_style()));
        }
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    // Neutral placeholder until the session restore resolves; rendering a
    // gated view here would flash the wrong screen.
    if app.session.is_loading() {
        frame.render_widget(
            Paragraph::new(Line::styled("Loading...", styles::muted_style())).centered(),
            area,
        );
        return;
    }

    match app.view {
        View::Login => login::render(frame, area, app),
        View::Register => register::render(frame, area, app),
        View::Home => home::render(frame, area, app),
        View::Convert => convert::render(frame, area, app),
        View::Transform => transform::render(frame, area, app),
        View::Profile => profile::render(frame, area, app),
        View::About => about::render(frame, area, app),
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let message = if app.busy {
        app.status_message
            .clone()
            .unwrap_or_else(|| "Working...".to_string())
    } else {
        app.status_message.clone().unwrap_or_default()
    };

    let hints = "Tab: fields | Enter: submit | Ctrl+L: logout | Ctrl+Q: quit";
    let padding = area
        .width
        .saturating_sub(message.len() as u16 + hints.len() as u16 + 2) as usize;

    let line = Line::from(vec![
        Span::raw(" "),
        Span::styled(message, styles::highlight_style()),
        Span::raw(" ".repeat(padding)),
        Span::styled(hints, styles::muted_style()),
    ]);

    frame.render_widget(
        Paragraph::new(line).style(styles::status_bar_style()),
        area,
    );
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect(50, 60, frame.area());
    frame.render_widget(Clear, area);

    let keys = [
        ("F1", "Toggle this help"),
        ("F2-F6", "Switch views"),
        ("Tab / Shift+Tab", "Move between fields"),
        ("Enter", "Submit the focused form"),
        ("Left / Right", "Adjust the selected option"),
        ("Ctrl+L", "Log out"),
        ("Ctrl+Q / Ctrl+C", "Quit"),
    ];

    let mut lines = vec![Line::raw("")];
    for (key, desc) in keys {
        lines.push(Line::from(vec![
            Span::raw("  "),
            Span::styled(format!("{:<16}", key), styles::help_key_style()),
            Span::styled(desc, styles::help_desc_style()),
        ]));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true))
        .title(" Help ");

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Centered rectangle occupying the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
