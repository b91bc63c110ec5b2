//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, TransformForm};
use crate::models::{OutputFormat, Resize};
use crate::route::View;

/// Rotation steps cycled through on the transform view.
const ROTATION_STEPS: [i32; 3] = [90, 180, 270];

/// Resize presets cycled through on the transform view.
const RESIZE_PRESETS: [(u32, u32); 4] = [(640, 480), (800, 600), (1280, 720), (1920, 1080)];

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    // Help overlay swallows everything except its dismissal keys
    if matches!(app.state, AppState::ShowingHelp) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
            app.state = AppState::Normal;
        }
        return Ok(false);
    }

    // Global shortcuts
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            KeyCode::Char('l') => {
                app.logout();
                return Ok(false);
            }
            _ => {}
        }
    }

    match key.code {
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::F(n @ 2..=6) => {
            navigate_function_key(app, n);
            return Ok(false);
        }
        KeyCode::Tab => {
            app.focus_next();
            return Ok(false);
        }
        KeyCode::BackTab => {
            app.focus_prev();
            return Ok(false);
        }
        _ => {}
    }

    match app.view {
        View::Login => handle_login(app, key).await,
        View::Register => handle_register(app, key).await,
        View::Home => handle_home(app, key),
        View::Convert => handle_convert(app, key),
        View::Transform => handle_transform(app, key),
        View::Profile => handle_profile(app, key).await,
        View::About => {}
    }

    Ok(false)
}

/// F2..F6 map onto the nav bar, which differs with session state. The
/// navigate call applies the access gate either way.
fn navigate_function_key(app: &mut App, n: u8) {
    let target = if app.session.is_authenticated() {
        match n {
            2 => Some(View::Home),
            3 => Some(View::Convert),
            4 => Some(View::Transform),
            5 => Some(View::Profile),
            6 => Some(View::About),
            _ => None,
        }
    } else {
        match n {
            2 => Some(View::Login),
            3 => Some(View::Register),
            6 => Some(View::About),
            _ => None,
        }
    };

    if let Some(view) = target {
        app.navigate(view);
    }
}

/// Apply a char/backspace edit to the text field at the given focus index.
fn edit_field(field: &mut String, key: KeyEvent, max_len: usize) {
    match key.code {
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
            App::push_bounded(field, c, max_len);
        }
        KeyCode::Backspace => {
            field.pop();
        }
        _ => {}
    }
}

async fn handle_login(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        if app.focus_index == 2 || app.focus_index == 1 {
            app.attempt_login().await;
        } else {
            app.focus_next();
        }
        return;
    }

    match app.focus_index {
        0 => edit_field(&mut app.login_form.username, key, App::max_username_len()),
        1 => edit_field(&mut app.login_form.password, key, App::max_password_len()),
        _ => {}
    }
}

async fn handle_register(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        if app.focus_index == 3 {
            app.attempt_register().await;
        } else {
            app.focus_next();
        }
        return;
    }

    match app.focus_index {
        0 => edit_field(
            &mut app.register_form.username,
            key,
            App::max_username_len(),
        ),
        1 => edit_field(
            &mut app.register_form.password,
            key,
            App::max_password_len(),
        ),
        2 => edit_field(&mut app.register_form.confirm, key, App::max_password_len()),
        _ => {}
    }
}

async fn handle_profile(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        if app.focus_index == 3 {
            app.attempt_update_password().await;
        } else {
            app.focus_next();
        }
        return;
    }

    match app.focus_index {
        0 => edit_field(&mut app.profile_form.current, key, App::max_password_len()),
        1 => edit_field(&mut app.profile_form.new, key, App::max_password_len()),
        2 => edit_field(&mut app.profile_form.confirm, key, App::max_password_len()),
        _ => {}
    }
}

fn handle_home(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.start_upload();
        return;
    }
    if app.focus_index == 0 {
        edit_field(&mut app.upload_form.path, key, usize::MAX);
    }
}

fn handle_convert(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.start_convert();
        }
        KeyCode::Left | KeyCode::Right if app.focus_index == 1 => {
            // next() cycles through all formats, so either arrow works.
            app.convert_form.format = app.convert_form.format.next();
        }
        _ if app.focus_index == 0 => {
            edit_field(&mut app.convert_form.path, key, usize::MAX);
        }
        _ => {}
    }
}

fn cycle_resize(current: Option<Resize>) -> Option<Resize> {
    let next = match current {
        None => RESIZE_PRESETS.first(),
        Some(r) => RESIZE_PRESETS
            .iter()
            .position(|&(w, h)| w == r.width && h == r.height)
            .and_then(|i| RESIZE_PRESETS.get(i + 1)),
    };
    next.map(|&(width, height)| Resize { width, height })
}

fn cycle_rotation(current: Option<i32>) -> Option<i32> {
    match current {
        None => Some(ROTATION_STEPS[0]),
        Some(deg) => ROTATION_STEPS
            .iter()
            .position(|&s| s == deg)
            .and_then(|i| ROTATION_STEPS.get(i + 1))
            .copied(),
    }
}

fn cycle_optional_format(current: Option<OutputFormat>) -> Option<OutputFormat> {
    match current {
        None => Some(OutputFormat::Jpg),
        // Gif is last in the cycle; wrapping past it returns to "keep".
        Some(OutputFormat::Gif) => None,
        Some(f) => Some(f.next()),
    }
}

fn handle_transform(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Enter {
        app.start_transform();
        return;
    }

    if app.focus_index == 1 {
        let form = &mut app.transform_form;
        match key.code {
            KeyCode::Up => {
                form.option_selection = form
                    .option_selection
                    .checked_sub(1)
                    .unwrap_or(TransformForm::OPTION_COUNT - 1);
            }
            KeyCode::Down => {
                form.option_selection = (form.option_selection + 1) % TransformForm::OPTION_COUNT;
            }
            KeyCode::Char(' ') | KeyCode::Left | KeyCode::Right => match form.option_selection {
                0 => form.resize = cycle_resize(form.resize),
                1 => form.rotate = cycle_rotation(form.rotate),
                2 => form.grayscale = !form.grayscale,
                3 => form.sepia = !form.sepia,
                4 => form.format = cycle_optional_format(form.format),
                _ => {}
            },
            _ => {}
        }
        return;
    }

    if app.focus_index == 0 {
        edit_field(&mut app.transform_form.path, key, usize::MAX);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotation_cycles_through_steps_and_back_to_off() {
        assert_eq!(cycle_rotation(None), Some(90));
        assert_eq!(cycle_rotation(Some(90)), Some(180));
        assert_eq!(cycle_rotation(Some(180)), Some(270));
        assert_eq!(cycle_rotation(Some(270)), None);
    }

    #[test]
    fn resize_cycles_through_presets_and_back_to_off() {
        let first = cycle_resize(None).unwrap();
        assert_eq!((first.width, first.height), (640, 480));

        let last = Resize {
            width: 1920,
            height: 1080,
        };
        assert_eq!(cycle_resize(Some(last)), None);
    }

    #[test]
    fn optional_format_cycles_back_to_keep() {
        assert_eq!(cycle_optional_format(None), Some(OutputFormat::Jpg));
        assert_eq!(
            cycle_optional_format(Some(OutputFormat::Jpg)),
            Some(OutputFormat::Png)
        );
        assert_eq!(cycle_optional_format(Some(OutputFormat::Gif)), None);
    }
}
