//! ROWCRUSH - terminal front end
//!
//! Owns the terminal, turns key events into game commands and runs the
//! frame loop.

use crossterm::{
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
        supports_keyboard_enhancement,
    },
};
use ratatui::{Terminal, backend::CrosstermBackend};
use rowcrush::{
    Game, Settings,
    clock::GameClock,
    keys::{self, KeyAction, REPEAT_DELAY_STEP_MS, ReleaseTimeout},
    ui,
};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Target frame rate
const TARGET_FPS: u64 = 30;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);

/// Application state
enum Screen {
    Help { hide_help: bool },
    Playing(Game),
}

/// What the frame loop should do after an event
enum Flow {
    Continue,
    Start,
    Quit,
}

/// Get the rowcrush temp directory, creating it if needed
fn rowcrush_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("rowcrush");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> io::Result<()> {
    // Log to a file so output never lands on the game screen
    let log_dir = rowcrush_temp_dir();
    let file_appender = tracing_appender::rolling::never(&log_dir, "rowcrush.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("rowcrush=info")),
        )
        .with_ansi(false)
        .init();

    info!("ROWCRUSH starting up, log dir={}", log_dir.display());

    let mut settings = Settings::load();

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    // Real key releases when the terminal can report them
    let releases_reported = supports_keyboard_enhancement().unwrap_or(false);
    if releases_reported {
        execute!(
            stdout(),
            PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
        )?;
    }
    info!(releases_reported, "terminal key release support");

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut settings, releases_reported);

    // Restore terminal
    if releases_reported {
        execute!(stdout(), PopKeyboardEnhancementFlags)?;
    }
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    if let Err(e) = settings.save() {
        eprintln!("Warning: Could not save settings: {}", e);
    }

    match &result {
        Ok(Some(score)) => {
            println!("\nThanks for playing ROWCRUSH!");
            println!("Final Score: {} | High Score: {}", score, settings.high_score);
        }
        Ok(None) => println!("\nThanks for playing ROWCRUSH!"),
        Err(_) => {}
    }

    result.map(|_| ())
}

/// Run the frame loop; returns the last game's score, if a game was started
fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    settings: &mut Settings,
    releases_reported: bool,
) -> io::Result<Option<u64>> {
    let clock = GameClock::new();
    let mut release_timeout = ReleaseTimeout::default();
    let mut screen = if settings.help.hide_help {
        Screen::Playing(Game::new(settings.game_config(), clock.now_ms()))
    } else {
        Screen::Help { hide_help: false }
    };

    loop {
        let frame_start = Instant::now();
        let now = clock.now_ms();

        terminal.draw(|frame| match &screen {
            Screen::Help { hide_help } => ui::render_help(frame, *hide_help),
            Screen::Playing(game) => ui::render_game(frame, &game.snapshot(now), settings.high_score),
        })?;

        // Drain input until the frame is due
        loop {
            let timeout = FRAME_DURATION.saturating_sub(frame_start.elapsed());
            if !event::poll(timeout)? {
                break;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };

            let flow = match &mut screen {
                Screen::Help { hide_help } => handle_help_key(key, hide_help, settings),
                Screen::Playing(game) => handle_game_key(
                    key,
                    game,
                    settings,
                    &mut release_timeout,
                    releases_reported,
                    clock.now_ms(),
                ),
            };

            match flow {
                Flow::Continue => {}
                Flow::Start => {
                    screen = Screen::Playing(Game::new(settings.game_config(), clock.now_ms()));
                }
                Flow::Quit => {
                    return Ok(match &screen {
                        Screen::Playing(game) => Some(game.score().points),
                        Screen::Help { .. } => None,
                    });
                }
            }
        }

        let Screen::Playing(game) = &mut screen else {
            continue;
        };

        let now = clock.now_ms();
        if !releases_reported {
            for key in release_timeout.expired(now) {
                game.release_key(key);
            }
        }

        if let Some(event) = game.update(now) {
            if event.topped_out {
                release_timeout.clear();
                if settings.record_score(game.score().points) {
                    info!(score = settings.high_score, "new high score");
                }
                save_or_warn(settings);
            }
        }
        settings.record_score(game.score().points);
    }
}

fn handle_help_key(key: KeyEvent, hide_help: &mut bool, settings: &mut Settings) -> Flow {
    if key.kind != KeyEventKind::Press {
        return Flow::Continue;
    }
    match key.code {
        KeyCode::Char(' ') => {
            settings.help.hide_help = *hide_help;
            save_or_warn(settings);
            Flow::Start
        }
        KeyCode::Char('h') | KeyCode::Char('H') => {
            *hide_help = !*hide_help;
            Flow::Continue
        }
        _ => match keys::map_key(&key) {
            Some(KeyAction::Quit) => Flow::Quit,
            _ => Flow::Continue,
        },
    }
}

fn handle_game_key(
    key: KeyEvent,
    game: &mut Game,
    settings: &mut Settings,
    release_timeout: &mut ReleaseTimeout,
    releases_reported: bool,
    now: u64,
) -> Flow {
    let held = keys::held_key_for(key.code);

    match key.kind {
        KeyEventKind::Release => {
            if let Some(held) = held {
                game.release_key(held);
            }
            return Flow::Continue;
        }
        // The core does its own repeating
        KeyEventKind::Repeat => return Flow::Continue,
        KeyEventKind::Press => {}
    }

    if !releases_reported {
        if let Some(held) = held {
            release_timeout.seen(held, now);
        }
    }

    let Some(action) = keys::map_key(&key) else {
        return Flow::Continue;
    };

    match action {
        KeyAction::Game(command) => {
            game.apply(command, now);
        }
        KeyAction::Faster => {
            let delay = settings.set_repeat_delay(
                settings.gameplay.repeat_delay_ms.saturating_sub(REPEAT_DELAY_STEP_MS),
            );
            game.set_repeat_delay(delay);
            save_or_warn(settings);
        }
        KeyAction::Slower => {
            let delay =
                settings.set_repeat_delay(settings.gameplay.repeat_delay_ms + REPEAT_DELAY_STEP_MS);
            game.set_repeat_delay(delay);
            save_or_warn(settings);
        }
        KeyAction::ResetHighScore => {
            settings.reset_high_score();
            save_or_warn(settings);
            info!("high score reset");
        }
        KeyAction::ToggleHelp => {
            settings.help.hide_help = !settings.help.hide_help;
            save_or_warn(settings);
        }
        KeyAction::Quit => return Flow::Quit,
    }

    Flow::Continue
}

fn save_or_warn(settings: &Settings) {
    if let Err(e) = settings.save() {
        warn!("could not save settings: {}", e);
    }
}
