use std::time::Duration;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::generator::Canvas;
use crate::scoring::Scoring;
use crate::session::Level;

/// Exposure of a congruence item before it is hidden
pub const EXPOSURE: Duration = Duration::from_millis(700);
/// How long judgment feedback stays on screen
pub const FEEDBACK: Duration = Duration::from_millis(2000);
/// Blank gap between two items of a reading drill
pub const PAIR_PAUSE: Duration = Duration::from_millis(500);

/// Stable exercise identifiers; the lowercase form doubles as the route name.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    ValueEnum,
    Serialize,
    Deserialize,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExerciseId {
    #[default]
    El1,
    El2,
    El4,
    Eo,
    Eo1,
    Eo2,
    Eo3,
    Eo4,
    Evm1,
    Epm1,
    Epm2,
    Epm3,
    Edm1,
    Edm4,
}

impl ExerciseId {
    /// Catalogue order; `CATALOGUE[id as usize]` describes `id`.
    pub const ALL: [ExerciseId; 14] = [
        ExerciseId::El1,
        ExerciseId::El2,
        ExerciseId::El4,
        ExerciseId::Eo,
        ExerciseId::Eo1,
        ExerciseId::Eo2,
        ExerciseId::Eo3,
        ExerciseId::Eo4,
        ExerciseId::Evm1,
        ExerciseId::Epm1,
        ExerciseId::Epm2,
        ExerciseId::Epm3,
        ExerciseId::Edm1,
        ExerciseId::Edm4,
    ];

    /// Map a route or identifier to an exercise, falling back to the default
    /// for anything unknown.
    pub fn resolve(route: &str) -> ExerciseId {
        let wanted = route.trim().trim_start_matches('/');
        Self::ALL
            .iter()
            .copied()
            .find(|id| id.to_string().eq_ignore_ascii_case(wanted))
            .unwrap_or_default()
    }

    pub fn spec(self) -> &'static ExerciseSpec {
        &CATALOGUE[self as usize]
    }

    pub fn next(self) -> ExerciseId {
        Self::ALL[(self as usize + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> ExerciseId {
        Self::ALL[(self as usize + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Titles of the (repeated, missing) answer columns
    pub fn recall_questions(self) -> Option<(&'static str, &'static str)> {
        match self {
            ExerciseId::Eo2 => Some(("¿Qué número se ha repetido?", "¿Qué número no ha salido?")),
            ExerciseId::Eo3 => Some(("¿Qué palabra se ha repetido?", "¿Qué palabra no ha salido?")),
            ExerciseId::Eo4 => Some(("¿Qué par se ha repetido?", "¿Qué par no ha salido?")),
            ExerciseId::Evm1 => Some(("¿Qué mes ha salido 2 veces?", "¿Qué mes no ha salido?")),
            _ => None,
        }
    }
}

/// `base + max(0, 9 - level) * step`: lower levels see each stimulus longer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayTiming {
    pub base: Duration,
    pub step: Duration,
}

impl DisplayTiming {
    pub const fn from_millis(base_ms: u64, step_ms: u64) -> Self {
        Self {
            base: Duration::from_millis(base_ms),
            step: Duration::from_millis(step_ms),
        }
    }

    pub fn display_time(&self, level: Level) -> Duration {
        self.base + self.step * level.steps_below_max()
    }

    /// (fastest, slowest) display time across all levels
    pub fn bounds(&self) -> (Duration, Duration) {
        (
            self.display_time(Level::MAX),
            self.display_time(Level::MIN),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Each stimulus is shown for `timing`; with a pause the stimulus is hidden
    /// for that long before the next one appears.
    AutoAdvance {
        timing: DisplayTiming,
        pause: Option<Duration>,
    },
    /// Each stimulus is exposed briefly and then waits for one judgment key.
    AwaitResponse {
        exposure: Duration,
        feedback: Duration,
        scoring: Scoring,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberRange {
    Fixed { min: u64, max: u64 },
    /// `[10^(level-1), 10^level - 1]`
    ByLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VocabSource {
    Digits,
    /// Name of an embedded word list
    Words(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Content {
    NumberPairs { count: usize, range: NumberRange },
    Sums { count: usize },
    LetterPairs { count: usize },
    Tracking { count: usize, symbol: char, canvas: Canvas },
    RepeatOmission {
        vocabulary: VocabSource,
        len: usize,
        canvas: Option<Canvas>,
    },
    /// Name of an embedded congruence table
    Congruence { table: &'static str },
    Eidetic { groups: usize, width: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExerciseSpec {
    pub id: ExerciseId,
    pub title: &'static str,
    pub description: &'static str,
    pub mode: Mode,
    pub content: Content,
}

impl ExerciseSpec {
    pub fn is_judgment(&self) -> bool {
        matches!(self.mode, Mode::AwaitResponse { .. })
    }
}

const READING: Mode = Mode::AutoAdvance {
    timing: DisplayTiming::from_millis(400, 100),
    pause: Some(PAIR_PAUSE),
};

const fn tracking(base_ms: u64) -> Mode {
    Mode::AutoAdvance {
        timing: DisplayTiming::from_millis(base_ms, 100),
        pause: None,
    }
}

const fn judgment(scoring: Scoring) -> Mode {
    Mode::AwaitResponse {
        exposure: EXPOSURE,
        feedback: FEEDBACK,
        scoring,
    }
}

const EIDETIC: Mode = Mode::AutoAdvance {
    timing: DisplayTiming::from_millis(400, 0),
    pause: None,
};

const WIDE_CANVAS: Canvas = Canvas::new(800, 500, 50);
const SMALL_CANVAS: Canvas = Canvas::new(600, 400, 100);

pub static CATALOGUE: [ExerciseSpec; 14] = [
    ExerciseSpec {
        id: ExerciseId::El1,
        title: "Ejercicio de Lectura",
        description: "Lee los dos números antes de que desaparezcan.",
        mode: READING,
        content: Content::NumberPairs {
            count: 40,
            range: NumberRange::Fixed { min: 0, max: 99 },
        },
    },
    ExerciseSpec {
        id: ExerciseId::El2,
        title: "Leer la sílaba formada",
        description: "Lee la sílaba que forman la consonante y la vocal.",
        mode: READING,
        content: Content::LetterPairs { count: 40 },
    },
    ExerciseSpec {
        id: ExerciseId::El4,
        title: "Leer el número formado",
        description: "Números con tantas cifras como el nivel elegido.",
        mode: READING,
        content: Content::NumberPairs {
            count: 40,
            range: NumberRange::ByLevel,
        },
    },
    ExerciseSpec {
        id: ExerciseId::Eo,
        title: "Operaciones",
        description: "Suma mentalmente cada pareja de números.",
        mode: Mode::AutoAdvance {
            timing: DisplayTiming::from_millis(1000, 0),
            pause: None,
        },
        content: Content::Sums { count: 20 },
    },
    ExerciseSpec {
        id: ExerciseId::Eo1,
        title: "Seguimiento de la letra \"O\"",
        description: "Sigue la letra O con la mirada.",
        mode: tracking(200),
        content: Content::Tracking {
            count: 140,
            symbol: 'O',
            canvas: WIDE_CANVAS,
        },
    },
    ExerciseSpec {
        id: ExerciseId::Eo2,
        title: "Seguimiento de números",
        description: "¿Qué número se ha repetido y cuál no ha salido?",
        mode: tracking(300),
        content: Content::RepeatOmission {
            vocabulary: VocabSource::Digits,
            len: 8,
            canvas: Some(SMALL_CANVAS),
        },
    },
    ExerciseSpec {
        id: ExerciseId::Eo3,
        title: "Seguimiento de palabras",
        description: "¿Qué palabra se ha repetido y cuál no ha salido?",
        mode: tracking(300),
        content: Content::RepeatOmission {
            vocabulary: VocabSource::Words("words"),
            len: 8,
            canvas: Some(SMALL_CANVAS),
        },
    },
    ExerciseSpec {
        id: ExerciseId::Eo4,
        title: "Seguimiento de pares de palabras",
        description: "¿Qué par se ha repetido y cuál no ha salido?",
        mode: tracking(800),
        content: Content::RepeatOmission {
            vocabulary: VocabSource::Words("word_pairs"),
            len: 5,
            canvas: Some(SMALL_CANVAS),
        },
    },
    ExerciseSpec {
        id: ExerciseId::Evm1,
        title: "Velocidad de memorización. Meses",
        description: "¿Qué mes se ha repetido y cuál no ha salido?",
        mode: tracking(300),
        content: Content::RepeatOmission {
            vocabulary: VocabSource::Words("months"),
            len: 8,
            canvas: None,
        },
    },
    ExerciseSpec {
        id: ExerciseId::Epm1,
        title: "Artículo y sustantivo",
        description: "¿Concuerdan el artículo y el sustantivo?",
        mode: judgment(Scoring::Average),
        content: Content::Congruence {
            table: "article_noun",
        },
    },
    ExerciseSpec {
        id: ExerciseId::Epm2,
        title: "Sustantivo y adjetivo",
        description: "¿Concuerdan el sustantivo y el adjetivo? Cada fallo penaliza 2 segundos.",
        mode: judgment(Scoring::PenaltyAdjusted),
        content: Content::Congruence {
            table: "noun_adjective",
        },
    },
    ExerciseSpec {
        id: ExerciseId::Epm3,
        title: "Artículo, sustantivo y adjetivo",
        description: "¿Concuerdan las tres palabras?",
        mode: judgment(Scoring::Average),
        content: Content::Congruence {
            table: "article_noun_adjective",
        },
    },
    ExerciseSpec {
        id: ExerciseId::Edm1,
        title: "Memoria eidética. 2 dígitos",
        description: "Escribe los dígitos que has visto.",
        mode: EIDETIC,
        content: Content::Eidetic {
            groups: 2,
            width: 1,
        },
    },
    ExerciseSpec {
        id: ExerciseId::Edm4,
        title: "Memoria eidética. 9 dígitos",
        description: "Escribe los tres grupos de cifras que has visto.",
        mode: EIDETIC,
        content: Content::Eidetic {
            groups: 3,
            width: 3,
        },
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalogue_is_indexed_by_id() {
        for id in ExerciseId::ALL {
            assert_eq!(id.spec().id, id);
        }
        assert_eq!(CATALOGUE.len(), ExerciseId::ALL.len());
    }

    #[test]
    fn display_time_is_non_increasing_with_level() {
        for spec in CATALOGUE.iter() {
            if let Mode::AutoAdvance { timing, .. } = spec.mode {
                let times: Vec<Duration> = (1..=9)
                    .map(|l| timing.display_time(Level::clamped(l)))
                    .collect();
                assert!(
                    times.windows(2).all(|w| w[0] >= w[1]),
                    "{} display times increase with level: {times:?}",
                    spec.id
                );
                let (fastest, slowest) = timing.bounds();
                assert!(times.iter().all(|t| *t >= fastest && *t <= slowest));
            }
        }
    }

    #[test]
    fn reading_timing_matches_formula() {
        let timing = DisplayTiming::from_millis(400, 100);
        assert_eq!(
            timing.display_time(Level::MAX),
            Duration::from_millis(400)
        );
        assert_eq!(
            timing.display_time(Level::MIN),
            Duration::from_millis(1200)
        );
        assert_eq!(
            timing.display_time(Level::clamped(5)),
            Duration::from_millis(800)
        );
    }

    #[test]
    fn resolve_known_routes() {
        assert_eq!(ExerciseId::resolve("epm2"), ExerciseId::Epm2);
        assert_eq!(ExerciseId::resolve("/EO3"), ExerciseId::Eo3);
        assert_eq!(ExerciseId::resolve(" Evm1 "), ExerciseId::Evm1);
        assert_eq!(ExerciseId::resolve("eo"), ExerciseId::Eo);
    }

    #[test]
    fn resolve_unknown_route_falls_back_to_default() {
        assert_eq!(ExerciseId::resolve("progress"), ExerciseId::El1);
        assert_eq!(ExerciseId::resolve(""), ExerciseId::El1);
    }

    #[test]
    fn display_is_uppercase_identifier() {
        assert_eq!(ExerciseId::Evm1.to_string(), "EVM1");
        assert_eq!(ExerciseId::Eo.to_string(), "EO");
    }

    #[test]
    fn next_and_prev_cycle() {
        assert_eq!(ExerciseId::Edm4.next(), ExerciseId::El1);
        assert_eq!(ExerciseId::El1.prev(), ExerciseId::Edm4);
        for id in ExerciseId::ALL {
            assert_eq!(id.next().prev(), id);
        }
    }

    #[test]
    fn recall_questions_exist_for_repeat_omission_content() {
        for spec in CATALOGUE.iter() {
            let has_questions = spec.id.recall_questions().is_some();
            let is_recall = matches!(spec.content, Content::RepeatOmission { .. });
            assert_eq!(has_questions, is_recall, "{}", spec.id);
        }
    }

    #[test]
    fn pair_tracking_asks_about_pairs() {
        let (repeated, missing) = ExerciseId::Eo4.recall_questions().unwrap();
        assert!(repeated.contains("par"));
        assert!(missing.contains("par"));
        assert!(!repeated.contains("palabra"));
    }

    #[test]
    fn judgment_descriptions_do_not_name_keys() {
        for spec in CATALOGUE.iter().filter(|s| s.is_judgment()) {
            assert!(!spec.description.contains("z ="), "{}", spec.id);
        }
    }

    #[test]
    fn judgment_exercises_use_fixed_windows() {
        for spec in CATALOGUE.iter().filter(|s| s.is_judgment()) {
            assert_matches::assert_matches!(
                spec.mode,
                Mode::AwaitResponse { exposure, feedback, .. }
                    if exposure == EXPOSURE && feedback == FEEDBACK
            );
        }
    }
}
