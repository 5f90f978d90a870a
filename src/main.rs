use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use notify_rust::{Notification, Urgency};
use ratatui::prelude::*;
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod app;
mod config;
mod countdown;
mod ledger;
mod quiz;
mod settings;
mod ui;

use app::{Action, App, Screen, SettingsAction};
use config::Config;
use ui::Theme;

// ============================================================================
// Type Aliases & Constants
// ============================================================================

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
const TICK_RATE: Duration = Duration::from_millis(50);

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone)]
#[command(author, version, about = "🧮 screentime-quiz - Earn screen time by passing a times-tables quiz")]
struct Args {
    /// Config file (JSON). Defaults to ./screentime-quiz/config.json
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Score needed to pass, in percent (50-100)
    #[arg(short, long)]
    passing: Option<u32>,
    /// Questions per quiz (5-30)
    #[arg(short, long)]
    questions: Option<u32>,
    /// Minutes earned per pass (1-60)
    #[arg(short, long)]
    reward: Option<u32>,
    /// Most minutes that can be earned per day (10-240)
    #[arg(short, long)]
    daily_max: Option<u32>,
    /// Do not keep a daily ledger; every pass unlocks
    #[arg(long)]
    no_daily_cap: bool,
    /// Color theme: default, nord, dracula, gruvbox or solarized
    #[arg(short = 't', long)]
    theme: Option<String>,
    #[arg(long)]
    no_sound: bool,
    #[arg(long)]
    no_notify: bool,
    /// Write logs to this file (filter with RUST_LOG)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn apply(&self, config: &mut Config) {
        if let Some(p) = self.passing { config.passing_percentage = p; }
        if let Some(q) = self.questions { config.questions_per_session = q; }
        if let Some(r) = self.reward { config.reward_minutes = r; }
        if let Some(d) = self.daily_max { config.daily_max_minutes = d; }
        if self.no_daily_cap { config.daily_cap_enabled = false; }
        if let Some(t) = &self.theme { config.theme = t.clone(); }
        if self.no_sound { config.sound_enabled = false; }
        if self.no_notify { config.notifications = false; }
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

// ============================================================================
// Event Handlers
// ============================================================================

enum KeyResult {
    Act(Action),
    Help,
    Quit,
    Ignore,
}

fn resolve_key(key: KeyEvent, screen: &Screen) -> KeyResult {
    use KeyResult::{Act, Help, Ignore, Quit};

    match screen {
        Screen::Home => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Quit,
            KeyCode::Char('?') | KeyCode::Char('h') => Help,
            KeyCode::Enter | KeyCode::Char('s') => Act(Action::StartChallenge),
            KeyCode::Char('p') => Act(Action::OpenSettings),
            _ => Ignore,
        },
        Screen::ParentSettings(editor) if editor.editing => match key.code {
            KeyCode::Char(c) => Act(Action::Settings(SettingsAction::Type(c))),
            KeyCode::Backspace => Act(Action::Settings(SettingsAction::Erase)),
            KeyCode::Enter => Act(Action::Settings(SettingsAction::Commit)),
            KeyCode::Esc => Act(Action::Settings(SettingsAction::Cancel)),
            _ => Ignore,
        },
        Screen::ParentSettings(_) => match key.code {
            KeyCode::Esc | KeyCode::Char('b') => Act(Action::Back),
            KeyCode::Down | KeyCode::Char('j') => Act(Action::Settings(SettingsAction::NextField)),
            KeyCode::Up | KeyCode::Char('k') => Act(Action::Settings(SettingsAction::PrevField)),
            KeyCode::Right | KeyCode::Char('l') => Act(Action::Settings(SettingsAction::Increase)),
            KeyCode::Left | KeyCode::Char('h') => Act(Action::Settings(SettingsAction::Decrease)),
            KeyCode::Enter | KeyCode::Char('e') => Act(Action::Settings(SettingsAction::BeginEdit)),
            KeyCode::Char('s') => Act(Action::StartChallenge),
            KeyCode::Char('?') => Help,
            _ => Ignore,
        },
        // every printable key goes into the answer box
        Screen::Quiz(_) => match key.code {
            KeyCode::Char(c) => Act(Action::Type(c)),
            KeyCode::Backspace => Act(Action::Erase),
            KeyCode::Enter => Act(Action::Submit),
            KeyCode::Esc => Act(Action::ExitQuiz),
            _ => Ignore,
        },
        Screen::Unlocked(_) => match key.code {
            KeyCode::Char('e') | KeyCode::Enter => Act(Action::EarnMore),
            KeyCode::Char('x') | KeyCode::Esc => Act(Action::EndSession),
            KeyCode::Char('?') => Help,
            _ => Ignore,
        },
    }
}

/// Returns `true` when the app should quit.
fn handle_input(key: KeyEvent, app: &mut App) -> bool {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return true;
    }

    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
            app.show_help = false;
        }
        return false;
    }

    match resolve_key(key, app.screen()) {
        KeyResult::Act(action) => {
            app.dispatch(action, Instant::now());
            false
        }
        KeyResult::Help => {
            app.show_help = true;
            false
        }
        KeyResult::Quit => true,
        KeyResult::Ignore => false,
    }
}

// ============================================================================
// Utilities
// ============================================================================

fn notify(title: &str, body: &str, sound: bool) {
    if let Err(e) = Notification::new()
        .summary(title)
        .body(body)
        .appname("screentime-quiz")
        .icon("alarm-clock")
        .urgency(Urgency::Critical)
        .show()
    {
        warn!("desktop notification failed: {e}");
    }

    if sound {
        std::thread::spawn(|| {
            for (cmd, file) in [
                ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
                ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
                ("aplay", "/usr/share/sounds/generic.wav"),
            ] {
                if std::path::Path::new(file).exists() {
                    let _ = std::process::Command::new(cmd)
                        .arg(file)
                        .stdout(std::process::Stdio::null())
                        .stderr(std::process::Stdio::null())
                        .spawn();
                    break;
                }
            }
        });
    }
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = &args.log_file {
        init_logging(path)?;
    }

    let config_path = args.config.clone().unwrap_or_else(config::default_path);
    let mut config = match config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            warn!("{e}; using defaults");
            Config::default()
        }
    };
    args.apply(&mut config);
    info!(?config, "starting");

    let theme_name = ui::known_theme(&config.theme).unwrap_or_else(|| {
        warn!(theme = %config.theme, known = ?ui::THEMES, "unknown theme; using default");
        "default"
    });
    let theme = ui::get_theme(theme_name);
    let mut app = App::new(&config);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app, &theme, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    theme: &Theme,
    config: &Config,
) -> Result<()> {
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| ui::render_ui(f, app, theme))?;

        let timeout = TICK_RATE.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handle_input(key, app) {
                    info!("quit");
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= TICK_RATE {
            if app.update(Instant::now()) && config.notifications {
                notify("Time's up! ⏰", "Your earned play time is over.", config.sound_enabled);
            }
            last_tick = Instant::now();
        }
    }
}
