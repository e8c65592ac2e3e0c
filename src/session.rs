use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::catalogue::ExerciseId;

/// Difficulty level, always within `Level::MIN..=Level::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Level(u8);

impl Level {
    pub const MIN: Level = Level(1);
    pub const MAX: Level = Level(9);

    pub fn new(value: u8) -> Option<Self> {
        (Self::MIN.0..=Self::MAX.0)
            .contains(&value)
            .then_some(Level(value))
    }

    /// Clamp an arbitrary value into the valid range
    pub fn clamped(value: u8) -> Self {
        Level(value.clamp(Self::MIN.0, Self::MAX.0))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    pub fn up(self) -> Self {
        Self::clamped(self.0.saturating_add(1))
    }

    pub fn down(self) -> Self {
        Self::clamped(self.0.saturating_sub(1))
    }

    /// Levels below the maximum; drives the slower display times at easy levels.
    pub fn steps_below_max(self) -> u32 {
        u32::from(Self::MAX.0 - self.0)
    }
}

impl Default for Level {
    fn default() -> Self {
        Self::MAX
    }
}

impl TryFrom<u8> for Level {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Level::new(value).ok_or_else(|| format!("level must be between 1 and 9, got {value}"))
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub const IDLE_ELAPSED: &str = "00:00";

/// Render an elapsed duration as `mm:ss`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Cross-exercise state shared by whichever exercise screen is active.
///
/// Owned by the controller for as long as one exercise screen is mounted.
/// `running` gates every timing engine: an engine that observes `running ==
/// false` mid-run aborts on its next tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    level: Level,
    running: bool,
    elapsed_display: String,
    exercise: ExerciseId,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(Level::default(), ExerciseId::default())
    }
}

impl SessionState {
    pub fn new(level: Level, exercise: ExerciseId) -> Self {
        Self {
            level,
            running: false,
            elapsed_display: IDLE_ELAPSED.to_string(),
            exercise,
        }
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn exercise(&self) -> ExerciseId {
        self.exercise
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed_display(&self) -> &str {
        &self.elapsed_display
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_display = format_elapsed(elapsed);
    }

    pub fn start_exercise(&mut self) {
        self.running = true;
        self.elapsed_display = IDLE_ELAPSED.to_string();
    }

    pub fn stop_exercise(&mut self) {
        self.running = false;
        self.elapsed_display = IDLE_ELAPSED.to_string();
    }

    /// A run that ran to completion; the final elapsed time stays visible.
    pub fn finish_exercise(&mut self) {
        self.running = false;
    }

    /// Changing the level always ends the current run.
    pub fn set_level(&mut self, level: Level) {
        self.level = level;
        self.stop_exercise();
    }

    /// Switching exercise always ends the current run.
    pub fn set_exercise(&mut self, exercise: ExerciseId) {
        self.exercise = exercise;
        self.stop_exercise();
    }
}
