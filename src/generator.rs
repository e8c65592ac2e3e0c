use std::fmt;
use std::ops::RangeInclusive;

use itertools::Itertools;
use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;

use crate::catalogue::{Content, ExerciseSpec, NumberRange, VocabSource};
use crate::session::Level;
use crate::util::zero_pad;
use crate::vocab::{self, CongruenceItem, VocabError};

pub const CONSONANTS: [char; 21] = [
    'B', 'C', 'D', 'F', 'G', 'H', 'J', 'K', 'L', 'M', 'N', 'P', 'Q', 'R', 'S', 'T', 'V', 'W',
    'X', 'Y', 'Z',
];
pub const VOWELS: [char; 5] = ['A', 'E', 'I', 'O', 'U'];

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("a sequence of {len} items cannot hold an item twice (need at least 2)")]
    SequenceTooShort { len: usize },
    #[error(
        "a sequence of {len} items does not fit a vocabulary of {vocabulary}: \
         one slot repeats an item and one item must stay missing"
    )]
    SequenceTooLong { len: usize, vocabulary: usize },
    #[error("vocabulary contains duplicate entries")]
    DuplicateEntry,
    #[error(transparent)]
    Vocab(#[from] VocabError),
}

/// Virtual drawing area for positioned stimuli; the UI scales it to the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u16,
    pub height: u16,
    pub padding: u16,
}

impl Canvas {
    pub const fn new(width: u16, height: u16, padding: u16) -> Self {
        Self {
            width,
            height,
            padding,
        }
    }

    /// Uniform point at least `padding` away from every edge
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Position {
        Position {
            x: rng.gen_range(self.padding..self.width - self.padding),
            y: rng.gen_range(self.padding..self.height - self.padding),
            canvas: *self,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub canvas: Canvas,
}

impl Position {
    /// Position as fractions of the canvas, in `0.0..1.0`
    pub fn relative(&self) -> (f64, f64) {
        (
            f64::from(self.x) / f64::from(self.canvas.width),
            f64::from(self.y) / f64::from(self.canvas.height),
        )
    }
}

/// A number shown zero-padded to a fixed number of digits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitGroup {
    pub value: u64,
    pub width: usize,
}

impl fmt::Display for DigitGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&zero_pad(self.value, self.width))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stimulus {
    NumberPair(u64, u64),
    Sum(u64, u64),
    Syllable { consonant: char, vowel: char },
    Token { text: String, at: Option<Position> },
    Congruence(CongruenceItem),
    Digits(Vec<DigitGroup>),
}

impl Stimulus {
    /// The separate pieces the UI lays out side by side
    pub fn parts(&self) -> Vec<String> {
        match self {
            Stimulus::NumberPair(a, b) => vec![a.to_string(), b.to_string()],
            Stimulus::Sum(a, b) => vec![a.to_string(), "+".to_string(), b.to_string()],
            Stimulus::Syllable { consonant, vowel } => {
                vec![consonant.to_string(), vowel.to_string()]
            }
            Stimulus::Token { text, .. } => vec![text.clone()],
            Stimulus::Congruence(item) => item.words.clone(),
            Stimulus::Digits(groups) => groups.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn position(&self) -> Option<Position> {
        match self {
            Stimulus::Token { at, .. } => *at,
            _ => None,
        }
    }
}

/// What the user is asked about once the sequence has been shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecallTarget {
    None,
    RepeatOmission {
        repeated: String,
        missing: String,
        options: Vec<String>,
    },
    Exact(Vec<DigitGroup>),
}

/// Immutable stimuli for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StimulusSequence {
    items: Vec<Stimulus>,
    target: RecallTarget,
}

impl StimulusSequence {
    pub fn new(items: Vec<Stimulus>, target: RecallTarget) -> Self {
        Self { items, target }
    }

    pub fn items(&self) -> &[Stimulus] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Stimulus> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn target(&self) -> &RecallTarget {
        &self.target
    }
}

/// Result of a repeat+omission draw.
///
/// `pool` holds the `len` vocabulary values that took part in the draw, in
/// vocabulary order: every pool value appears once in `sequence`, except
/// `repeated` (twice) and `missing` (never).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatOmission<T> {
    pub sequence: Vec<T>,
    pub repeated: T,
    pub missing: T,
    pub pool: Vec<T>,
}

/// Draw `len` items from `vocabulary` with exactly one repeat and one omission.
///
/// Shuffle-and-slice: the first shuffled value becomes the missing one, the
/// next `len - 1` are shown, and one of those is inserted a second time at a
/// random index. Always terminates; rejects impossible requests up front.
pub fn repeat_omission<T, R>(
    vocabulary: &[T],
    len: usize,
    rng: &mut R,
) -> Result<RepeatOmission<T>, GeneratorError>
where
    T: Clone + Eq + std::hash::Hash,
    R: Rng + ?Sized,
{
    if len < 2 {
        return Err(GeneratorError::SequenceTooShort { len });
    }
    if len > vocabulary.len() {
        return Err(GeneratorError::SequenceTooLong {
            len,
            vocabulary: vocabulary.len(),
        });
    }
    if !vocabulary.iter().all_unique() {
        return Err(GeneratorError::DuplicateEntry);
    }

    let mut drawn: Vec<usize> = (0..vocabulary.len()).collect();
    drawn.shuffle(rng);
    drawn.truncate(len);

    let missing = drawn[0];
    let mut sequence: Vec<usize> = drawn[1..].to_vec();
    let repeated = *sequence
        .choose(rng)
        .ok_or(GeneratorError::SequenceTooShort { len })?;
    let at = rng.gen_range(0..=sequence.len());
    sequence.insert(at, repeated);

    drawn.sort_unstable();

    Ok(RepeatOmission {
        sequence: sequence.iter().map(|&i| vocabulary[i].clone()).collect(),
        repeated: vocabulary[repeated].clone(),
        missing: vocabulary[missing].clone(),
        pool: drawn.iter().map(|&i| vocabulary[i].clone()).collect(),
    })
}

/// `[10^(level-1), 10^level - 1]`
pub fn level_range(level: Level) -> RangeInclusive<u64> {
    let digits = u32::from(level.get());
    10u64.pow(digits - 1)..=10u64.pow(digits) - 1
}

pub fn number_pairs<R: Rng + ?Sized>(
    count: usize,
    range: RangeInclusive<u64>,
    rng: &mut R,
) -> Vec<Stimulus> {
    (0..count)
        .map(|_| Stimulus::NumberPair(rng.gen_range(range.clone()), rng.gen_range(range.clone())))
        .collect()
}

/// Addends whose total lies in `range`; both addends are at least 1.
pub fn sums<R: Rng + ?Sized>(
    count: usize,
    range: RangeInclusive<u64>,
    rng: &mut R,
) -> Vec<Stimulus> {
    let low = (*range.start()).max(2);
    let high = (*range.end()).max(low);
    (0..count)
        .map(|_| {
            let total = rng.gen_range(low..=high);
            let operand = rng.gen_range(1..total);
            Stimulus::Sum(operand, total - operand)
        })
        .collect()
}

pub fn syllables<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Vec<Stimulus> {
    (0..count)
        .map(|_| Stimulus::Syllable {
            consonant: CONSONANTS[rng.gen_range(0..CONSONANTS.len())],
            vowel: VOWELS[rng.gen_range(0..VOWELS.len())],
        })
        .collect()
}

pub fn tracking<R: Rng + ?Sized>(
    count: usize,
    symbol: char,
    canvas: Canvas,
    rng: &mut R,
) -> Vec<Stimulus> {
    (0..count)
        .map(|_| Stimulus::Token {
            text: symbol.to_string(),
            at: Some(canvas.random_position(rng)),
        })
        .collect()
}

pub fn digit_groups<R: Rng + ?Sized>(groups: usize, width: u32, rng: &mut R) -> Vec<DigitGroup> {
    let bound = 10u64.pow(width);
    (0..groups)
        .map(|_| DigitGroup {
            value: rng.gen_range(0..bound),
            width: width as usize,
        })
        .collect()
}

fn vocabulary_for(source: VocabSource) -> Result<Vec<String>, GeneratorError> {
    match source {
        VocabSource::Digits => Ok((0..=9).map(|d: u8| d.to_string()).collect()),
        VocabSource::Words(name) => Ok(vocab::word_list(name)?.words),
    }
}

/// Build the stimuli for one run of `spec` at `level`
pub fn generate<R: Rng + ?Sized>(
    spec: &ExerciseSpec,
    level: Level,
    rng: &mut R,
) -> Result<StimulusSequence, GeneratorError> {
    let sequence = match spec.content {
        Content::NumberPairs { count, range } => {
            let range = match range {
                NumberRange::Fixed { min, max } => min..=max,
                NumberRange::ByLevel => level_range(level),
            };
            StimulusSequence::new(number_pairs(count, range, rng), RecallTarget::None)
        }
        Content::Sums { count } => {
            StimulusSequence::new(sums(count, level_range(level), rng), RecallTarget::None)
        }
        Content::LetterPairs { count } => {
            StimulusSequence::new(syllables(count, rng), RecallTarget::None)
        }
        Content::Tracking {
            count,
            symbol,
            canvas,
        } => StimulusSequence::new(tracking(count, symbol, canvas, rng), RecallTarget::None),
        Content::RepeatOmission {
            vocabulary,
            len,
            canvas,
        } => {
            let words = vocabulary_for(vocabulary)?;
            let draw = repeat_omission(&words, len, rng)?;
            let items = draw
                .sequence
                .into_iter()
                .map(|text| Stimulus::Token {
                    text,
                    at: canvas.map(|c| c.random_position(rng)),
                })
                .collect();
            StimulusSequence::new(
                items,
                RecallTarget::RepeatOmission {
                    repeated: draw.repeated,
                    missing: draw.missing,
                    options: draw.pool,
                },
            )
        }
        Content::Congruence { table } => {
            let table = vocab::congruence_table(table)?;
            let items = table.items.into_iter().map(Stimulus::Congruence).collect();
            StimulusSequence::new(items, RecallTarget::None)
        }
        Content::Eidetic { groups, width } => {
            let expected = digit_groups(groups, width, rng);
            StimulusSequence::new(
                vec![Stimulus::Digits(expected.clone())],
                RecallTarget::Exact(expected),
            )
        }
    };
    Ok(sequence)
}
