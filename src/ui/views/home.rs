//! Library view: the user's uploaded images plus the upload form.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::app::{App, MAX_UPLOAD_BYTES};
use crate::ui::styles;
use crate::utils::format::{format_bytes, truncate_string};

use super::{form_column, render_button, render_form_message, render_text_field};

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let column = form_column(area, 60);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Heading
            Constraint::Min(5),    // Image list
            Constraint::Length(3), // Path
            Constraint::Length(1), // File size preview
            Constraint::Length(1), // Button
            Constraint::Length(2), // Message
            Constraint::Length(2), // Hint
        ])
        .split(column);

    let heading = match app.session.username() {
        Some(name) => format!("Your images ({})", name),
        None => "Your images".to_string(),
    };
    frame.render_widget(
        Paragraph::new(Line::styled(heading, styles::title_style())).centered(),
        chunks[0],
    );

    render_image_list(frame, chunks[1], app);

    render_text_field(
        frame,
        chunks[2],
        "Upload file path",
        &app.upload_form.path,
        app.focus_index == 0,
        false,
    );
    render_size_preview(frame, chunks[3], app.upload_form.path.trim());
    render_button(frame, chunks[4], "Upload", app.focus_index == 1);
    render_form_message(frame, chunks[5], app.upload_form.error.as_deref(), None);

    let hint = format!("Files up to {} are accepted.", format_bytes(MAX_UPLOAD_BYTES));
    frame.render_widget(
        Paragraph::new(Line::styled(hint, styles::muted_style())).centered(),
        chunks[6],
    );
}

fn render_image_list(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false))
        .title(format!(" Library ({}) ", app.images.len()));

    if app.images.is_empty() {
        frame.render_widget(
            Paragraph::new(Line::styled("No images uploaded yet", styles::muted_style()))
                .centered()
                .block(block),
            area,
        );
        return;
    }

    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .images
        .iter()
        .map(|url| ListItem::new(truncate_string(display_name(url), width)))
        .collect();

    frame.render_widget(List::new(items).block(block), area);
}

/// Last path segment of an image URL, for display.
fn display_name(url: &str) -> &str {
    url.rsplit('/').next().filter(|s| !s.is_empty()).unwrap_or(url)
}

/// Size of the selected file, flagged when it exceeds the upload limit.
fn render_size_preview(frame: &mut Frame, area: Rect, path: &str) {
    if path.is_empty() {
        return;
    }
    let Ok(metadata) = std::fs::metadata(path) else {
        return;
    };

    let size = metadata.len();
    let (text, style) = if size > MAX_UPLOAD_BYTES {
        (
            format!("{} (over the limit)", format_bytes(size)),
            styles::error_style(),
        )
    } else {
        (format_bytes(size), styles::muted_style())
    };

    frame.render_widget(
        Paragraph::new(Line::styled(text, style)).centered(),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_takes_the_last_url_segment() {
        assert_eq!(display_name("https://cdn.example.com/u/1/cat.png"), "cat.png");
        assert_eq!(display_name("dog.jpg"), "dog.jpg");
        assert_eq!(display_name("https://cdn.example.com/u/1/"), "https://cdn.example.com/u/1/");
    }
}
