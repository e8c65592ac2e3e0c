use crate::util::mean;

/// Time added per wrong answer when blending errors into the latency metric
pub const ERROR_PENALTY_MS: f64 = 2000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub correct: bool,
    pub time_ms: u64,
}

impl Response {
    pub fn new(correct: bool, time_ms: u64) -> Self {
        Self { correct, time_ms }
    }

    /// Feedback line shown while the next item is pending
    pub fn feedback(&self) -> String {
        if self.correct {
            format!("¡Correcto! - T: {} ms", self.time_ms)
        } else {
            "Has fallado. +2 segundos de penalización".to_string()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scoring {
    /// Plain mean response time
    #[default]
    Average,
    /// Mean response time plus `incorrect * 2000ms / total`
    PenaltyAdjusted,
}

/// Qualitative bucket for an average response time; first matching row wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum PerformanceLabel {
    #[strum(to_string = "Velocidad supersónica")]
    Supersonic,
    #[strum(to_string = "Velocidad de la luz")]
    LightSpeed,
    #[strum(to_string = "Muy rápido")]
    VeryFast,
    #[strum(to_string = "Tranquilón")]
    Relaxed,
    #[strum(to_string = "Tortuga coja")]
    LameTortoise,
    #[strum(to_string = "Necesitas más práctica")]
    NeedsPractice,
}

const LABEL_THRESHOLDS: [(f64, PerformanceLabel); 5] = [
    (800.0, PerformanceLabel::Supersonic),
    (1200.0, PerformanceLabel::LightSpeed),
    (1500.0, PerformanceLabel::VeryFast),
    (2000.0, PerformanceLabel::Relaxed),
    (2500.0, PerformanceLabel::LameTortoise),
];

impl PerformanceLabel {
    pub fn for_time(time_ms: f64) -> Self {
        LABEL_THRESHOLDS
            .iter()
            .find(|(limit, _)| time_ms < *limit)
            .map(|(_, label)| *label)
            .unwrap_or(PerformanceLabel::NeedsPractice)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub average_time_ms: f64,
    pub error_penalty_ms: f64,
    /// The value the label was derived from
    pub scored_time_ms: f64,
    pub incorrect: usize,
    pub total: usize,
    pub label: PerformanceLabel,
}

pub fn average_time(responses: &[Response]) -> Option<f64> {
    let times: Vec<f64> = responses.iter().map(|r| r.time_ms as f64).collect();
    mean(&times)
}

pub fn error_penalty(responses: &[Response]) -> Option<f64> {
    if responses.is_empty() {
        return None;
    }
    let incorrect = responses.iter().filter(|r| !r.correct).count();
    Some(incorrect as f64 * ERROR_PENALTY_MS / responses.len() as f64)
}

/// Summarise a completed run. `None` when nothing was answered.
pub fn summarize(responses: &[Response], scoring: Scoring) -> Option<RunSummary> {
    let average_time_ms = average_time(responses)?;
    let error_penalty_ms = error_penalty(responses)?;
    let scored_time_ms = match scoring {
        Scoring::Average => average_time_ms,
        Scoring::PenaltyAdjusted => average_time_ms + error_penalty_ms,
    };

    Some(RunSummary {
        average_time_ms,
        error_penalty_ms,
        scored_time_ms,
        incorrect: responses.iter().filter(|r| !r.correct).count(),
        total: responses.len(),
        label: PerformanceLabel::for_time(scored_time_ms),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn responses(spec: &[(bool, u64)]) -> Vec<Response> {
        spec.iter().map(|&(c, t)| Response::new(c, t)).collect()
    }

    #[test]
    fn average_of_two_responses() {
        let rs = responses(&[(true, 500), (true, 1500)]);
        assert_eq!(average_time(&rs), Some(1000.0));
    }

    #[test]
    fn penalty_for_one_wrong_out_of_four() {
        let rs = responses(&[(true, 600), (false, 800), (true, 1000), (true, 1200)]);
        let summary = summarize(&rs, Scoring::PenaltyAdjusted).unwrap();
        assert_eq!(summary.average_time_ms, 900.0);
        assert_eq!(summary.error_penalty_ms, 500.0);
        assert_eq!(summary.scored_time_ms, 1400.0);
        assert_eq!(summary.label, PerformanceLabel::VeryFast);
        assert_eq!(summary.incorrect, 1);
        assert_eq!(summary.total, 4);
    }

    #[test]
    fn plain_average_ignores_penalty_for_label() {
        let rs = responses(&[(false, 700), (false, 700)]);
        let summary = summarize(&rs, Scoring::Average).unwrap();
        assert_eq!(summary.scored_time_ms, 700.0);
        assert_eq!(summary.error_penalty_ms, 2000.0);
        assert_eq!(summary.label, PerformanceLabel::Supersonic);
    }

    #[test]
    fn empty_run_has_no_summary() {
        assert_eq!(summarize(&[], Scoring::Average), None);
        assert_eq!(summarize(&[], Scoring::PenaltyAdjusted), None);
        assert_eq!(error_penalty(&[]), None);
    }

    #[test]
    fn label_boundaries_are_exclusive_upper_bounds() {
        assert_eq!(PerformanceLabel::for_time(799.0), PerformanceLabel::Supersonic);
        assert_eq!(PerformanceLabel::for_time(800.0), PerformanceLabel::LightSpeed);
        assert_eq!(PerformanceLabel::for_time(1199.9), PerformanceLabel::LightSpeed);
        assert_eq!(PerformanceLabel::for_time(1200.0), PerformanceLabel::VeryFast);
        assert_eq!(PerformanceLabel::for_time(1500.0), PerformanceLabel::Relaxed);
        assert_eq!(PerformanceLabel::for_time(2000.0), PerformanceLabel::LameTortoise);
        assert_eq!(PerformanceLabel::for_time(2499.0), PerformanceLabel::LameTortoise);
        assert_eq!(PerformanceLabel::for_time(2500.0), PerformanceLabel::NeedsPractice);
    }

    #[test]
    fn labels_render_in_spanish() {
        assert_eq!(PerformanceLabel::Supersonic.to_string(), "Velocidad supersónica");
        assert_eq!(
            PerformanceLabel::NeedsPractice.to_string(),
            "Necesitas más práctica"
        );
    }

    #[test]
    fn feedback_text() {
        assert_eq!(Response::new(true, 640).feedback(), "¡Correcto! - T: 640 ms");
        assert!(Response::new(false, 640).feedback().contains("penalización"));
    }
}
