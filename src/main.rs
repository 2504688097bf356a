mod app;
mod fetch;
mod omdb;
mod ui;

use std::sync::Arc;
use std::time::Instant;

use app::{App, InputMode};
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use fetch::{FetchMessage, Fetcher};
use omdb::OmdbClient;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

/// TUI movie search client for the OMDb API
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Search for this title immediately on startup
    query: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    init_tracing();

    let api = Arc::new(OmdbClient::new());
    let (fetcher, messages) = Fetcher::new(api);
    let mut app = App::new(fetcher);

    if let Some(query) = cli.query {
        app.query = query;
        app.submit_search(Instant::now());
    }

    // Init terminal
    let mut terminal = ratatui::init();

    // Initial grid geometry
    let size = terminal.size()?;
    app.update_grid_size(size.width, size.height);

    // Main loop
    let result = run_app(&mut terminal, &mut app, messages).await;

    // Restore terminal
    ratatui::restore();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }

    Ok(())
}

/// Logs go to a file under the cache directory; writing to stderr would
/// fight the UI for the terminal.
fn init_tracing() {
    match open_log_file() {
        Some(file) => {
            let filter =
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_ansi(false)
                .with_writer(Arc::new(file))
                .compact()
                .init();
        }
        None => {
            eprintln!("Warning: could not open a log file, logging is disabled");
        }
    }
}

fn open_log_file() -> Option<std::fs::File> {
    let project_dirs = directories::ProjectDirs::from("com", "movie-explorer", "movie-explorer")?;
    let cache_dir = project_dirs.cache_dir();
    std::fs::create_dir_all(cache_dir).ok()?;
    std::fs::File::options()
        .create(true)
        .append(true)
        .open(cache_dir.join("movie-explorer.log"))
        .ok()
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    mut messages: UnboundedReceiver<FetchMessage>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Fold in any fetch completions since the last pass
        while let Ok(msg) = messages.try_recv() {
            app.apply_fetch(msg, Instant::now());
        }
        app.tick(Instant::now());

        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        // Poll for events with a 250ms timeout
        if event::poll(std::time::Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                Event::Resize(width, height) => {
                    app.update_grid_size(width, height);
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_editing_key(app, key);
    } else if app.detail.is_some() {
        handle_detail_key(app, key);
    } else {
        handle_results_key(app, key);
    }
}

fn handle_editing_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.submit_search(Instant::now());
        }
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.query.pop();
        }
        KeyCode::Char(c) => {
            app.query.push(c);
        }
        _ => {}
    }
}

fn handle_results_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Enter => {
            app.open_selected_detail();
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.select_next();
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.select_prev();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_down();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_up();
        }
        KeyCode::Char('g') => {
            app.select_first();
        }
        KeyCode::Char('G') => {
            app.select_last();
        }
        KeyCode::Esc => {
            // Dismiss the banner first, then fall back to editing the query
            if app.banner.is_some() {
                app.hide_error();
            } else if !app.query.is_empty() {
                app.query.clear();
                app.input_mode = InputMode::Editing;
            }
        }
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => {
            app.close_detail();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.scroll_detail_down();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.scroll_detail_up();
        }
        KeyCode::PageDown => {
            app.scroll_detail_page_down();
        }
        KeyCode::PageUp => {
            app.scroll_detail_page_up();
        }
        KeyCode::Char('o') => {
            if let Some(ref detail) = app.detail {
                let url = detail.poster_src().to_string();
                let _ = std::process::Command::new("xdg-open").arg(&url).spawn();
                app.status_msg = format!("Opening: {url}");
            }
        }
        _ => {}
    }
}
