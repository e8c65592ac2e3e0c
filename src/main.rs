use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use flashdrill::{
    app::{App, Flow},
    app_dirs::AppDirs,
    catalogue::{ExerciseId, Mode, CATALOGUE},
    config::{Config, ConfigStore, FileConfigStore},
    engine::KeyBindingError,
    logging,
    runtime::{dispatch, CrosstermEventSource, FixedTicker, Runner},
    session::Level,
    ui::ui,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    time::{Duration, Instant},
};

/// flash-exercise trainer: timed reading, tracking, recall and word-judgment drills
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Flash exercises for the terminal. Each drill shows stimuli for a level-dependent time, then collects a timed answer and scores it. Level and exercise are remembered between launches."
)]
pub struct Cli {
    /// exercise to open (defaults to the last one used)
    #[clap(short = 'e', long, value_enum)]
    exercise: Option<ExerciseId>,

    /// difficulty level from 1 (slowest) to 9 (fastest)
    #[clap(short = 'l', long, value_parser = clap::value_parser!(u8).range(1..=9))]
    level: Option<u8>,

    /// seed the stimulus generator for reproducible runs
    #[clap(long)]
    seed: Option<u64>,

    /// key answering "the words agree" in judgment drills
    #[clap(long)]
    congruent_key: Option<char>,

    /// key answering "the words do not agree" in judgment drills
    #[clap(long)]
    incongruent_key: Option<char>,

    /// print the exercise catalogue and exit
    #[clap(long)]
    list: bool,
}

impl Cli {
    /// Command line flags win over the saved preferences
    fn apply(&self, config: &mut Config) {
        if let Some(exercise) = self.exercise {
            config.exercise = exercise;
        }
        if let Some(level) = self.level {
            config.level = Level::clamped(level);
        }
        if let Some(key) = self.congruent_key {
            config.congruent_key = key;
        }
        if let Some(key) = self.incongruent_key {
            config.incongruent_key = key;
        }
    }

    /// Saved preferences with the flags applied; a flag may not break the key pair
    fn merge(&self, mut config: Config) -> Result<Config, KeyBindingError> {
        self.apply(&mut config);
        config.validate()?;
        Ok(config)
    }
}

fn catalogue_listing() -> String {
    CATALOGUE
        .iter()
        .map(|spec| {
            let kind = match spec.mode {
                Mode::AutoAdvance { .. } => "auto",
                Mode::AwaitResponse { .. } => "judgment",
            };
            format!(
                "{:<6}{:<10}{}",
                spec.id.to_string().to_lowercase(),
                kind,
                spec.title
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if cli.list {
        println!("{}", catalogue_listing());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(path) = AppDirs::log_path() {
        logging::init_logging(&path)?;
    }

    let store = FileConfigStore::new();
    let config = match cli.merge(store.load()) {
        Ok(config) => config,
        Err(err) => {
            let mut cmd = Cli::command();
            cmd.error(ErrorKind::ArgumentConflict, err).exit();
        }
    };
    tracing::info!(exercise = %config.exercise, level = %config.level, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, cli.seed);
    let tick = Duration::from_millis(config.tick_rate_ms.max(1));
    let result = start_tui(&mut terminal, &mut app, tick);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = store.save(&app.config()) {
        tracing::warn!(path = %store.path().display(), %err, "could not save preferences");
    }

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    tick: Duration,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new(), FixedTicker::new(tick));

    loop {
        terminal.draw(|f| ui(app, f))?;

        if dispatch(app, runner.step(), Instant::now()) == Flow::Quit {
            break;
        }
    }

    tracing::info!("quit");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["flashdrill"]);

        assert_eq!(cli.exercise, None);
        assert_eq!(cli.level, None);
        assert_eq!(cli.seed, None);
        assert!(!cli.list);
    }

    #[test]
    fn test_cli_exercise() {
        let cli = Cli::parse_from(["flashdrill", "-e", "epm2"]);
        assert_eq!(cli.exercise, Some(ExerciseId::Epm2));

        let cli = Cli::parse_from(["flashdrill", "--exercise", "evm1"]);
        assert_eq!(cli.exercise, Some(ExerciseId::Evm1));

        assert!(Cli::try_parse_from(["flashdrill", "-e", "el3"]).is_err());
    }

    #[test]
    fn test_cli_level_range() {
        let cli = Cli::parse_from(["flashdrill", "-l", "3"]);
        assert_eq!(cli.level, Some(3));

        assert!(Cli::try_parse_from(["flashdrill", "--level", "0"]).is_err());
        assert!(Cli::try_parse_from(["flashdrill", "--level", "10"]).is_err());
    }

    #[test]
    fn test_cli_keys_and_seed() {
        let cli = Cli::parse_from([
            "flashdrill",
            "--congruent-key",
            "s",
            "--incongruent-key",
            "n",
            "--seed",
            "42",
        ]);
        assert_eq!(cli.congruent_key, Some('s'));
        assert_eq!(cli.incongruent_key, Some('n'));
        assert_eq!(cli.seed, Some(42));
    }

    #[test]
    fn test_cli_overrides_saved_config() {
        let mut config = Config {
            exercise: ExerciseId::Eo2,
            level: Level::clamped(7),
            ..Config::default()
        };
        let cli = Cli::parse_from(["flashdrill", "-l", "2", "--incongruent-key", "m"]);
        cli.apply(&mut config);

        assert_eq!(config.exercise, ExerciseId::Eo2);
        assert_eq!(config.level.get(), 2);
        assert_eq!(config.congruent_key, 'z');
        assert_eq!(config.incongruent_key, 'm');
    }

    #[test]
    fn test_cli_single_key_flag_cannot_collide_with_saved_key() {
        let cli = Cli::parse_from(["flashdrill", "--congruent-key", "x", "-e", "epm1"]);
        assert_eq!(
            cli.merge(Config::default()),
            Err(KeyBindingError::Identical('x'))
        );

        let cli = Cli::parse_from(["flashdrill", "--incongruent-key", "Z"]);
        assert_eq!(
            cli.merge(Config::default()),
            Err(KeyBindingError::Identical('z'))
        );

        let cli = Cli::parse_from(["flashdrill", "--congruent-key", "x", "--incongruent-key", "z"]);
        let config = cli.merge(Config::default()).unwrap();
        assert_eq!((config.congruent_key, config.incongruent_key), ('x', 'z'));
    }

    #[test]
    fn test_cli_rejects_level_keys_as_answers() {
        let cli = Cli::parse_from(["flashdrill", "--congruent-key", "+"]);
        assert_eq!(
            cli.merge(Config::default()),
            Err(KeyBindingError::Reserved('+'))
        );
    }

    #[test]
    fn test_catalogue_listing() {
        let listing = catalogue_listing();
        assert_eq!(listing.lines().count(), ExerciseId::ALL.len());
        assert!(listing.starts_with("el1"));
        assert!(listing.contains("epm2  judgment  Sustantivo y adjetivo"));
    }

    #[test]
    fn test_cli_command_is_valid() {
        Cli::command().debug_assert();
    }
}
