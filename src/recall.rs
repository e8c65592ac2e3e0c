use crate::generator::DigitGroup;
use crate::util::parse_digits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Verdict {
    #[strum(to_string = "Correcta")]
    Correct,
    #[strum(to_string = "Incorrecta")]
    Incorrect,
}

impl From<bool> for Verdict {
    fn from(correct: bool) -> Self {
        if correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}

impl Verdict {
    pub fn is_correct(self) -> bool {
        self == Verdict::Correct
    }
}

/// The two questions of a repeat/omission answer sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Repeated,
    Missing,
}

impl Column {
    pub fn other(self) -> Self {
        match self {
            Column::Repeated => Column::Missing,
            Column::Missing => Column::Repeated,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecallVerdicts {
    pub repeated: Verdict,
    pub missing: Verdict,
}

/// Answer sheet shown after a repeat/omission sequence: one pick per column,
/// then both columns are judged independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecallSheet {
    options: Vec<String>,
    repeated: String,
    missing: String,
    picks: [Option<usize>; 2],
    cursor: (Column, usize),
    verdicts: Option<RecallVerdicts>,
}

fn slot(column: Column) -> usize {
    match column {
        Column::Repeated => 0,
        Column::Missing => 1,
    }
}

impl RecallSheet {
    pub fn new(options: Vec<String>, repeated: String, missing: String) -> Self {
        Self {
            options,
            repeated,
            missing,
            picks: [None, None],
            cursor: (Column::Repeated, 0),
            verdicts: None,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn cursor(&self) -> (Column, usize) {
        self.cursor
    }

    pub fn move_cursor(&mut self, delta: isize) {
        if self.options.is_empty() {
            return;
        }
        let len = self.options.len() as isize;
        let index = (self.cursor.1 as isize + delta).rem_euclid(len);
        self.cursor.1 = index as usize;
    }

    pub fn switch_column(&mut self) {
        self.cursor.0 = self.cursor.0.other();
    }

    /// Pick the option under the cursor for the cursor's column
    pub fn pick_at_cursor(&mut self) -> bool {
        let (column, index) = self.cursor;
        self.pick(column, index)
    }

    /// Ignored once the sheet has been verified or for an out-of-range index.
    pub fn pick(&mut self, column: Column, index: usize) -> bool {
        if self.verdicts.is_some() || index >= self.options.len() {
            return false;
        }
        self.picks[slot(column)] = Some(index);
        true
    }

    pub fn picked(&self, column: Column) -> Option<&str> {
        self.picks[slot(column)].map(|i| self.options[i].as_str())
    }

    pub fn is_picked(&self, column: Column, index: usize) -> bool {
        self.picks[slot(column)] == Some(index)
    }

    /// Both columns have an answer
    pub fn is_ready(&self) -> bool {
        self.picks.iter().all(Option::is_some)
    }

    pub fn is_verified(&self) -> bool {
        self.verdicts.is_some()
    }

    /// Judge both picks. `None` until both columns are answered.
    pub fn verify(&mut self) -> Option<RecallVerdicts> {
        if !self.is_ready() {
            return None;
        }
        if self.verdicts.is_none() {
            self.verdicts = Some(RecallVerdicts {
                repeated: (self.picked(Column::Repeated) == Some(self.repeated.as_str())).into(),
                missing: (self.picked(Column::Missing) == Some(self.missing.as_str())).into(),
            });
        }
        self.verdicts
    }

    pub fn verdicts(&self) -> Option<RecallVerdicts> {
        self.verdicts
    }

    /// The right answer for `column`, revealed only after verification
    pub fn answer(&self, column: Column) -> Option<&str> {
        self.verdicts.map(|_| match column {
            Column::Repeated => self.repeated.as_str(),
            Column::Missing => self.missing.as_str(),
        })
    }
}

/// Whether typed entries equal the generated groups, compared by value.
pub fn matches_exact<S: AsRef<str>>(entries: &[S], expected: &[DigitGroup]) -> bool {
    entries.len() == expected.len()
        && entries
            .iter()
            .zip(expected)
            .all(|(entry, group)| parse_digits(entry.as_ref()) == Some(group.value))
}

/// Typed recall of eidetic digit groups. Focus moves to the next box once the
/// current one holds `width` digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactRecall {
    expected: Vec<DigitGroup>,
    entries: Vec<String>,
    focus: usize,
    verdict: Option<Verdict>,
}

impl ExactRecall {
    pub fn new(expected: Vec<DigitGroup>) -> Self {
        let entries = vec![String::new(); expected.len()];
        Self {
            expected,
            entries,
            focus: 0,
            verdict: None,
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn expected(&self) -> &[DigitGroup] {
        &self.expected
    }

    pub fn focus(&self) -> usize {
        self.focus
    }

    pub fn verdict(&self) -> Option<Verdict> {
        self.verdict
    }

    fn width(&self) -> usize {
        self.expected.get(self.focus).map_or(0, |g| g.width)
    }

    /// Returns false when the character was rejected.
    pub fn push_digit(&mut self, c: char) -> bool {
        if self.verdict.is_some() || !c.is_ascii_digit() {
            return false;
        }
        let width = self.width();
        let Some(entry) = self.entries.get_mut(self.focus) else {
            return false;
        };
        if entry.len() >= width {
            return false;
        }
        entry.push(c);
        if entry.len() == width && self.focus + 1 < self.entries.len() {
            self.focus += 1;
        }
        true
    }

    pub fn backspace(&mut self) {
        if self.verdict.is_some() {
            return;
        }
        let current_empty = self.entries.get(self.focus).map_or(true, String::is_empty);
        if current_empty && self.focus > 0 {
            self.focus -= 1;
        }
        if let Some(entry) = self.entries.get_mut(self.focus) {
            entry.pop();
        }
    }

    pub fn focus_next(&mut self) {
        if self.focus + 1 < self.entries.len() {
            self.focus += 1;
        }
    }

    pub fn focus_prev(&mut self) {
        self.focus = self.focus.saturating_sub(1);
    }

    pub fn verify(&mut self) -> Verdict {
        let verdict = self
            .verdict
            .unwrap_or_else(|| matches_exact(&self.entries, &self.expected).into());
        self.verdict = Some(verdict);
        verdict
    }
}
