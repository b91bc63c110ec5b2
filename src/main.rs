//! Pixelport - a terminal client for the Pixelport image service.
//!
//! Provides a keyboard-driven interface for uploading images, converting
//! between formats, and applying server-side transformations.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod route;
mod ui;
mod utils;

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use auth::{CredentialStore, TokenStore};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Initialize the tracing subscriber for logging.
///
/// Logs go to a file because the TUI owns the terminal. The returned guard
/// must stay alive for the duration of the program or buffered lines are
/// dropped. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: PathBuf) -> tracing_appender::non_blocking::WorkerGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let appender = tracing_appender::rolling::never(log_dir, "pixelport.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        return login_interactive().await;
    }

    let config = config::Config::load().unwrap_or_default();
    let log_dir = config.data_dir().unwrap_or_else(|_| PathBuf::from("."));
    std::fs::create_dir_all(&log_dir).ok();
    let _guard = init_tracing(log_dir);
    info!("Pixelport starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new()?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("Pixelport shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Drain session events and finished image jobs
        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

/// Interactive login from the command line, storing the token for later
/// TUI sessions.
async fn login_interactive() -> Result<()> {
    println!("\n=== Pixelport Login ===\n");

    let mut config = config::Config::load().unwrap_or_default();

    let username = if let Some(ref last_user) = config.last_username {
        print!("Username [{}]: ", last_user);
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;
        let input = input.trim();

        if input.is_empty() {
            last_user.clone()
        } else {
            input.to_string()
        }
    } else {
        prompt_username()?
    };

    let password = if CredentialStore::has_credentials(&username) {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "n" {
            CredentialStore::get_password(&username)?
        } else {
            prompt_password()?
        }
    } else {
        prompt_password()?
    };

    println!("\nAuthenticating...");

    let api = api::ApiClient::new(config.api_base_url())?;
    let token = api.login(&username, &password).await?;
    if token.is_empty() {
        anyhow::bail!("Login response contained no token");
    }

    let store = TokenStore::new(config.data_dir()?);
    store.save(&token, &username)?;

    if let Err(e) = CredentialStore::store(&username, &password) {
        eprintln!("Warning: could not store password in keychain: {}", e);
    }

    config.last_username = Some(username);
    config.save()?;

    println!("Login successful!\n");
    Ok(())
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
}
