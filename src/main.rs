pub mod ui;

use blinktrainer::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    controls::{command_for, Command},
    dataset::Dataset,
    logging,
    runtime::{CrosstermEventSource, FixedTicker, Runner, Ticker, TrainerEvent, TrainerEventSource},
    trainer::Trainer,
    Mode,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::KeyEvent,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use tracing::{debug, info};

const TICK_RATE_MS: u64 = 100;

/// terminal trainer for spotting blink and eye-movement artifacts in EEG
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Shows short windows of band-passed EEG and asks whether they contain a blink or a horizontal eye movement. Answers are graded against events detected on the EOG channels."
)]
pub struct Cli {
    /// which artifact to train on
    #[clap(short = 'm', long, value_enum)]
    mode: Option<Mode>,

    /// window length in seconds
    #[clap(short = 'w', long = "window")]
    window_secs: Option<f64>,

    /// CSV recording to use instead of the bundled sample
    #[clap(short = 'r', long)]
    recording: Option<PathBuf>,

    /// chance that a new window is placed around a known event
    #[clap(long)]
    snap_probability: Option<f64>,

    /// seed for the window picker, for reproducible sessions
    #[clap(long)]
    seed: Option<u64>,

    /// config file to read (and write with --save-config)
    #[clap(long)]
    config: Option<PathBuf>,

    /// persist the merged settings to the config file
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Overrides loaded settings with whatever was given on the command line
    fn apply(&self, config: &mut Config) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(window) = self.window_secs {
            config.window_secs = window;
        }
        if let Some(path) = &self.recording {
            config.recording = Some(path.clone());
        }
        if let Some(p) = self.snap_probability {
            config.event_snap_probability = p;
        }
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Quiz,
    Guide,
}

#[derive(Debug)]
pub struct App {
    pub trainer: Trainer,
    pub state: AppState,
}

impl App {
    pub fn new(trainer: Trainer) -> Self {
        Self {
            trainer,
            state: AppState::Quiz,
        }
    }

    /// Returns false once the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let guide_open = self.state == AppState::Guide;
        let Some(command) = command_for(key, self.trainer.quiz.state.phase, guide_open) else {
            return true;
        };

        match command {
            Command::Quit => return false,
            Command::ToggleGuide => {
                self.state = if guide_open {
                    AppState::Quiz
                } else {
                    AppState::Guide
                };
            }
            other => {
                // invalid transitions leave the screen as it is
                if let Err(e) = self.trainer.apply(other) {
                    debug!(error = %e, ?other, "command ignored");
                }
            }
        }
        true
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled: {e}");
        }
    }

    let store = cli.config_store();
    let mut config = store.load();
    cli.apply(&mut config);
    config.validate()?;
    if cli.save_config {
        store.save(&config)?;
    }

    info!(mode = %config.mode, window = config.window_secs, "starting session");

    let dataset = Dataset::load(&config)?;
    let mut app = App::new(Trainer::new(config, dataset, cli.seed)?);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result?;
    info!(
        score = app.trainer.quiz.state.score,
        attempts = app.trainer.quiz.state.attempts,
        "session finished"
    );
    println!("{}", app.trainer.summary());

    Ok(())
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    run_loop(terminal, app, &runner)
}

fn run_loop<B, E, T>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
) -> Result<(), Box<dyn Error>>
where
    B: Backend,
    E: TrainerEventSource,
    T: Ticker,
{
    terminal.draw(|f| ui(app, f))?;

    loop {
        match runner.step() {
            TrainerEvent::Tick => {}
            TrainerEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            TrainerEvent::Key(key) => {
                if !app.handle_key(key) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
