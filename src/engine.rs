use std::time::{Duration, Instant};

use rand::Rng;
use thiserror::Error;

use crate::catalogue::{ExerciseId, ExerciseSpec, Mode};
use crate::generator::{self, GeneratorError, RecallTarget, Stimulus, StimulusSequence};
use crate::recall::{ExactRecall, RecallSheet};
use crate::scoring::{summarize, Response, RunSummary};
use crate::session::{Level, SessionState};
use crate::timer::{RunId, Task, TaskSlot};

/// Keys that answer "agrees" / "does not agree" in judgment exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JudgmentKeys {
    pub congruent: char,
    pub incongruent: char,
}

impl Default for JudgmentKeys {
    fn default() -> Self {
        Self {
            congruent: 'z',
            incongruent: 'x',
        }
    }
}

/// Characters the controller already claims while a run is active
pub const RESERVED_KEYS: [char; 2] = ['+', '-'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum KeyBindingError {
    #[error("congruent and incongruent keys must differ (both are '{0}')")]
    Identical(char),
    #[error("'{0}' is reserved for changing the level")]
    Reserved(char),
    #[error("{0:?} cannot be used as an answer key")]
    Unusable(char),
}

impl JudgmentKeys {
    /// Two distinct printable keys, compared case-insensitively, outside [`RESERVED_KEYS`]
    pub fn new(congruent: char, incongruent: char) -> Result<Self, KeyBindingError> {
        for key in [congruent, incongruent] {
            if key.is_control() || key.is_whitespace() {
                return Err(KeyBindingError::Unusable(key));
            }
            if RESERVED_KEYS.contains(&key) {
                return Err(KeyBindingError::Reserved(key));
            }
        }
        if congruent.eq_ignore_ascii_case(&incongruent) {
            return Err(KeyBindingError::Identical(congruent));
        }
        Ok(Self {
            congruent,
            incongruent,
        })
    }

    /// `Some(true)` for the congruent key, `Some(false)` for the incongruent key
    fn answer(&self, key: char) -> Option<bool> {
        let key = key.to_ascii_lowercase();
        if key == self.congruent.to_ascii_lowercase() {
            Some(true)
        } else if key == self.incongruent.to_ascii_lowercase() {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    /// The current stimulus is visible
    Presenting,
    /// Blank gap between two stimuli
    Hidden,
    /// Stimulus hidden, waiting for a judgment key
    AwaitingInput,
    /// Judgment recorded; feedback on screen until the next stimulus
    Feedback(Response),
    Completed,
}

/// What a completed run leaves behind for the results screen
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// Nothing to answer; the sequence was only watched
    Viewed,
    /// `None` when the run completed without a single response
    Judged(Option<RunSummary>),
    Recall(RecallSheet),
    Exact(ExactRecall),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    Ignored,
    Recorded(Response),
}

/// Drives one exercise through its presentation loop.
///
/// Time never comes from the clock: every operation receives `now`, so the
/// engine is fully deterministic under test. Exactly one deadline is pending
/// at any time and it is tagged with the run that scheduled it.
#[derive(Debug)]
pub struct Engine {
    spec: &'static ExerciseSpec,
    keys: JudgmentKeys,
    level: Level,
    run: RunId,
    phase: Phase,
    sequence: Option<StimulusSequence>,
    index: usize,
    started_at: Option<Instant>,
    onset: Option<Instant>,
    responses: Vec<Response>,
    slot: TaskSlot,
    outcome: Option<RunOutcome>,
}

impl Engine {
    pub fn new(exercise: ExerciseId, keys: JudgmentKeys) -> Self {
        Self::with_spec(exercise.spec(), keys)
    }

    pub fn with_spec(spec: &'static ExerciseSpec, keys: JudgmentKeys) -> Self {
        Self {
            spec,
            keys,
            level: Level::default(),
            run: RunId::default(),
            phase: Phase::Idle,
            sequence: None,
            index: 0,
            started_at: None,
            onset: None,
            responses: Vec::new(),
            slot: TaskSlot::default(),
            outcome: None,
        }
    }

    pub fn spec(&self) -> &'static ExerciseSpec {
        self.spec
    }

    pub fn keys(&self) -> JudgmentKeys {
        self.keys
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn sequence(&self) -> Option<&StimulusSequence> {
        self.sequence.as_ref()
    }

    /// The stimulus on screen, if any
    pub fn visible_stimulus(&self) -> Option<&Stimulus> {
        match self.phase {
            Phase::Presenting => self.sequence.as_ref()?.get(self.index),
            _ => None,
        }
    }

    pub fn responses(&self) -> &[Response] {
        &self.responses
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    pub fn outcome_mut(&mut self) -> Option<&mut RunOutcome> {
        self.outcome.as_mut()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.slot.pending().map(|d| d.at)
    }

    pub fn is_active(&self) -> bool {
        !matches!(self.phase, Phase::Idle | Phase::Completed)
    }

    /// Generate a fresh sequence and show its first stimulus. An engine that
    /// is mid-run is reset first. On a generation failure the engine stays
    /// idle and the session is left stopped.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        session: &mut SessionState,
        rng: &mut R,
        now: Instant,
    ) -> Result<(), GeneratorError> {
        if self.phase != Phase::Idle {
            self.reset();
        }

        let level = session.level();
        let sequence = match generator::generate(self.spec, level, rng) {
            Ok(sequence) => sequence,
            Err(err) => {
                tracing::warn!(exercise = %self.spec.id, %err, "could not generate stimuli");
                session.stop_exercise();
                return Err(err);
            }
        };

        self.run = self.run.next();
        self.level = level;
        self.started_at = Some(now);
        tracing::info!(
            exercise = %self.spec.id,
            %level,
            run = ?self.run,
            items = sequence.len(),
            "run started"
        );
        self.sequence = Some(sequence);
        session.start_exercise();
        self.present(session, now);
        Ok(())
    }

    /// Abort the run, clearing every transient value.
    pub fn stop(&mut self, session: &mut SessionState) {
        if self.is_active() {
            tracing::info!(exercise = %self.spec.id, run = ?self.run, "run stopped");
        }
        self.reset();
        session.stop_exercise();
    }

    /// Advance time. Fires at most one due deadline.
    pub fn on_tick(&mut self, session: &mut SessionState, now: Instant) {
        if !self.is_active() {
            return;
        }
        if !session.is_running() {
            tracing::info!(exercise = %self.spec.id, run = ?self.run, "session stopped, aborting run");
            self.reset();
            return;
        }
        if let Some(started_at) = self.started_at {
            session.set_elapsed(now.saturating_duration_since(started_at));
        }
        match self.slot.take_due(self.run, now) {
            Some(Task::Hide) => self.hide(session, now),
            Some(Task::Advance) => self.advance(session, now),
            None => {}
        }
    }

    /// Judge the open stimulus. Only the two judgment keys count, once per
    /// stimulus, while the stimulus is shown or awaiting an answer.
    pub fn on_key(&mut self, key: char, now: Instant) -> KeyOutcome {
        let Mode::AwaitResponse { feedback, .. } = self.spec.mode else {
            return KeyOutcome::Ignored;
        };
        if !matches!(self.phase, Phase::Presenting | Phase::AwaitingInput) {
            tracing::debug!(%key, phase = ?self.phase, "key outside response window");
            return KeyOutcome::Ignored;
        }
        let Some(answer) = self.keys.answer(key) else {
            tracing::debug!(%key, "not a judgment key");
            return KeyOutcome::Ignored;
        };
        let Some(Stimulus::Congruence(item)) = self.sequence.as_ref().and_then(|s| s.get(self.index))
        else {
            return KeyOutcome::Ignored;
        };

        let elapsed = self
            .onset
            .map_or(Duration::ZERO, |onset| now.saturating_duration_since(onset));
        let time_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let response = Response::new(answer == item.correct, time_ms);

        self.responses.push(response);
        self.phase = Phase::Feedback(response);
        self.slot.schedule(self.run, now + feedback, Task::Advance);
        tracing::debug!(index = self.index, ?response, "response recorded");
        KeyOutcome::Recorded(response)
    }

    fn reset(&mut self) {
        self.slot.cancel();
        self.phase = Phase::Idle;
        self.sequence = None;
        self.index = 0;
        self.started_at = None;
        self.onset = None;
        self.responses.clear();
        self.outcome = None;
    }

    fn display_window(&self) -> Duration {
        match self.spec.mode {
            Mode::AutoAdvance { timing, .. } => timing.display_time(self.level),
            Mode::AwaitResponse { exposure, .. } => exposure,
        }
    }

    fn present(&mut self, session: &mut SessionState, now: Instant) {
        let remaining = self.sequence.as_ref().map_or(0, StimulusSequence::len);
        if self.index >= remaining {
            self.complete(session);
            return;
        }
        let window = self.display_window();
        self.phase = Phase::Presenting;
        self.onset = Some(now);
        self.slot.schedule(self.run, now + window, Task::Hide);
    }

    fn hide(&mut self, session: &mut SessionState, now: Instant) {
        match self.spec.mode {
            Mode::AutoAdvance {
                pause: Some(pause), ..
            } => {
                self.phase = Phase::Hidden;
                self.slot.schedule(self.run, now + pause, Task::Advance);
            }
            Mode::AutoAdvance { pause: None, .. } => self.advance(session, now),
            Mode::AwaitResponse { .. } => self.phase = Phase::AwaitingInput,
        }
    }

    fn advance(&mut self, session: &mut SessionState, now: Instant) {
        self.index += 1;
        self.present(session, now);
    }

    fn complete(&mut self, session: &mut SessionState) {
        self.slot.cancel();
        self.phase = Phase::Completed;
        let target = self.sequence.as_ref().map(StimulusSequence::target);
        let outcome = match (self.spec.mode, target) {
            (Mode::AwaitResponse { scoring, .. }, _) => {
                RunOutcome::Judged(summarize(&self.responses, scoring))
            }
            (
                _,
                Some(RecallTarget::RepeatOmission {
                    repeated,
                    missing,
                    options,
                }),
            ) => RunOutcome::Recall(RecallSheet::new(
                options.clone(),
                repeated.clone(),
                missing.clone(),
            )),
            (_, Some(RecallTarget::Exact(groups))) => {
                RunOutcome::Exact(ExactRecall::new(groups.clone()))
            }
            _ => RunOutcome::Viewed,
        };
        tracing::info!(
            exercise = %self.spec.id,
            run = ?self.run,
            responses = self.responses.len(),
            elapsed = session.elapsed_display(),
            "run completed"
        );
        self.outcome = Some(outcome);
        session.finish_exercise();
    }
}
