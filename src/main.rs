//! blockfall - a falling-block puzzle game for the terminal
//!
//! The game state lives in [`game::Game`]; this binary is the driver:
//! it owns the terminal, maps keys to actions, measures elapsed time
//! for the tick, and draws the result every frame.

mod board;
mod game;
mod input;
mod piece;
mod score;
mod settings;
mod spawner;
mod tetromino;
mod ui;

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

use game::{Action, Game};
use input::InputHandler;
use settings::Settings;

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Get the blockfall temp directory, creating it if needed
fn blockfall_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("blockfall");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    // Setup tracing to a per-session log file; the terminal itself
    // belongs to the game while it runs
    let log_dir = blockfall_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("blockfall=debug".parse().unwrap()),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "blockfall starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    // Load settings
    let settings = Settings::load();

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    // Run app and capture result
    let result = run_app(&mut terminal, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    // Persist settings (writes the default file on first run)
    if let Err(e) = settings.save() {
        tracing::warn!("could not save settings: {}", e);
    }

    if let Ok(game) = &result {
        println!("Thanks for playing blockfall!");
        println!("Final score: {}", game.score().points);
        println!(
            "Level: {} | Lines: {}",
            game.score().level,
            game.score().lines
        );
    }

    result.map(|_| ())
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &Settings,
) -> io::Result<Game> {
    let mut game = Game::new();
    let mut input = InputHandler::from_settings(settings);
    let mut last_frame = Instant::now();

    loop {
        // Render
        terminal.draw(|frame| ui::render_game(frame, &game, settings))?;

        // Handle input
        if event::poll(FRAME_DURATION)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    for action in input.key_down(key) {
                        if action == Action::Quit {
                            tracing::info!("quit requested");
                            return Ok(game);
                        }
                        game.apply(action);
                    }
                }
                Event::Key(key) if key.kind == KeyEventKind::Release => {
                    input.key_up(key);
                }
                _ => {}
            }
        }

        // Process held keys for DAS/ARR
        for action in input.update() {
            game.apply(action);
        }

        // Advance game time by however long this frame actually took
        let now = Instant::now();
        game.tick(now - last_frame);
        last_frame = now;
    }
}
