use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::catalogue::ExerciseId;
use crate::config::Config;
use crate::engine::{Engine, Phase, RunOutcome};
use crate::session::{Level, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Screen controller: owns the session and the engine of the mounted exercise
#[derive(Debug)]
pub struct App {
    pub session: SessionState,
    pub engine: Engine,
    config: Config,
    rng: StdRng,
    /// Last start failure, shown in the status line
    pub error: Option<String>,
}

impl App {
    /// `seed` makes every generated sequence reproducible.
    pub fn new(config: &Config, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            session: SessionState::new(config.level, config.exercise),
            engine: Engine::new(config.exercise, config.keys()),
            config: config.clone(),
            rng,
            error: None,
        }
    }

    pub fn exercise(&self) -> ExerciseId {
        self.session.exercise()
    }

    /// Current preferences, for saving on exit
    pub fn config(&self) -> Config {
        Config {
            level: self.session.level(),
            exercise: self.session.exercise(),
            ..self.config.clone()
        }
    }

    pub fn start(&mut self, now: Instant) {
        self.error = None;
        if let Err(err) = self.engine.start(&mut self.session, &mut self.rng, now) {
            self.error = Some(err.to_string());
        }
    }

    pub fn stop(&mut self) {
        self.engine.stop(&mut self.session);
    }

    /// The "Comenzar" / "Stop" button
    pub fn start_or_stop(&mut self, now: Instant) {
        if self.engine.is_active() {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// The "Siguiente" button: discard the finished run and begin a new one
    pub fn next(&mut self, now: Instant) {
        self.stop();
        self.start(now);
    }

    pub fn select_exercise(&mut self, exercise: ExerciseId) {
        self.engine.stop(&mut self.session);
        self.session.set_exercise(exercise);
        self.engine = Engine::new(exercise, self.config.keys());
        self.error = None;
    }

    pub fn set_level(&mut self, level: Level) {
        if level == self.session.level() {
            return;
        }
        self.engine.stop(&mut self.session);
        self.session.set_level(level);
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.engine.on_tick(&mut self.session, now);
    }

    /// Label of the primary action for the current state
    pub fn action_label(&self) -> &'static str {
        match (self.engine.phase(), self.engine.outcome()) {
            (Phase::Completed, Some(RunOutcome::Recall(sheet))) if !sheet.is_verified() => {
                "Corregir"
            }
            (Phase::Completed, Some(RunOutcome::Exact(recall))) if recall.verdict().is_none() => {
                "Corregir"
            }
            (Phase::Completed, _) => "Siguiente",
            _ if self.engine.is_active() => "Stop",
            _ => "Comenzar",
        }
    }

    /// Enter: start, stop, verify the answers, or move on to the next run.
    fn primary_action(&mut self, now: Instant) {
        if self.engine.phase() != Phase::Completed {
            self.start_or_stop(now);
            return;
        }
        match self.engine.outcome_mut() {
            Some(RunOutcome::Recall(sheet)) if !sheet.is_verified() => {
                if let Some(verdicts) = sheet.verify() {
                    tracing::info!(?verdicts, "recall verified");
                }
            }
            Some(RunOutcome::Exact(recall)) if recall.verdict().is_none() => {
                let verdict = recall.verify();
                tracing::info!(%verdict, "exact recall verified");
            }
            _ => self.next(now),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match key.code {
            KeyCode::Esc => {
                if self.engine.is_active() {
                    self.stop();
                } else {
                    return Flow::Quit;
                }
            }
            KeyCode::Enter => self.primary_action(now),
            KeyCode::Tab => self.select_exercise(self.exercise().next()),
            KeyCode::BackTab => self.select_exercise(self.exercise().prev()),
            KeyCode::Char('+') => self.set_level(self.session.level().up()),
            KeyCode::Char('-') => self.set_level(self.session.level().down()),
            code => self.answer_key(code, now),
        }
        Flow::Continue
    }

    fn answer_key(&mut self, code: KeyCode, now: Instant) {
        if self.engine.is_active() {
            if let KeyCode::Char(c) = code {
                self.engine.on_key(c, now);
            }
            return;
        }

        match self.engine.outcome_mut() {
            Some(RunOutcome::Recall(sheet)) => match code {
                KeyCode::Up => sheet.move_cursor(-1),
                KeyCode::Down => sheet.move_cursor(1),
                KeyCode::Left | KeyCode::Right => sheet.switch_column(),
                KeyCode::Char(' ') => {
                    sheet.pick_at_cursor();
                }
                _ => {}
            },
            Some(RunOutcome::Exact(recall)) => match code {
                KeyCode::Char(c) => {
                    recall.push_digit(c);
                }
                KeyCode::Backspace => recall.backspace(),
                KeyCode::Left => recall.focus_prev(),
                KeyCode::Right => recall.focus_next(),
                _ => {}
            },
            _ => {}
        }
    }
}
