// End-to-end runs through the library API with a synthetic clock.

use std::time::{Duration, Instant};

use flashdrill::catalogue::{ExerciseId, CATALOGUE};
use flashdrill::engine::{Engine, JudgmentKeys, KeyOutcome, Phase, RunOutcome};
use flashdrill::generator::{RecallTarget, Stimulus};
use flashdrill::recall::{Column, Verdict};
use flashdrill::scoring::PerformanceLabel;
use flashdrill::session::{Level, SessionState};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

/// Tick in 10ms steps until the engine completes or `limit` passes
fn run_to_end(engine: &mut Engine, session: &mut SessionState, t0: Instant, limit: Duration) -> Instant {
    let mut now = t0;
    while engine.phase() != Phase::Completed && now <= t0 + limit {
        now += ms(10);
        engine.on_tick(session, now);
    }
    now
}

#[test]
fn every_auto_advance_exercise_completes_at_every_level() {
    for spec in CATALOGUE.iter().filter(|s| !s.is_judgment()) {
        for level in [1u8, 5, 9] {
            let mut session = SessionState::new(Level::clamped(level), spec.id);
            let mut engine = Engine::new(spec.id, JudgmentKeys::default());
            let t0 = Instant::now();
            engine
                .start(&mut session, &mut StdRng::seed_from_u64(u64::from(level)), t0)
                .unwrap();
            run_to_end(&mut engine, &mut session, t0, Duration::from_secs(600));

            assert_eq!(engine.phase(), Phase::Completed, "{} at level {level}", spec.id);
            assert!(!session.is_running());
            assert!(engine.outcome().is_some());
        }
    }
}

#[test]
fn recall_sheet_answers_match_generated_sequence() {
    let mut session = SessionState::new(Level::MAX, ExerciseId::Eo4);
    let mut engine = Engine::new(ExerciseId::Eo4, JudgmentKeys::default());
    let t0 = Instant::now();
    engine
        .start(&mut session, &mut StdRng::seed_from_u64(77), t0)
        .unwrap();
    let (repeated, missing) = match engine.sequence().map(|s| s.target().clone()) {
        Some(RecallTarget::RepeatOmission {
            repeated, missing, ..
        }) => (repeated, missing),
        other => panic!("unexpected target {other:?}"),
    };

    run_to_end(&mut engine, &mut session, t0, Duration::from_secs(30));

    let Some(RunOutcome::Recall(sheet)) = engine.outcome_mut() else {
        panic!("expected a recall sheet");
    };
    let index_of = |value: &str| sheet.options().iter().position(|o| o == value).unwrap();
    let (r, m) = (index_of(&repeated), index_of(&missing));
    sheet.pick(Column::Repeated, r);
    sheet.pick(Column::Missing, m);
    let verdicts = sheet.verify().unwrap();
    assert_eq!(verdicts.repeated, Verdict::Correct);
    assert_eq!(verdicts.missing, Verdict::Correct);
}

#[test]
fn perfect_fast_judgment_run_is_supersonic() {
    let mut session = SessionState::new(Level::MAX, ExerciseId::Epm3);
    let mut engine = Engine::new(ExerciseId::Epm3, JudgmentKeys::default());
    let mut now = Instant::now();
    engine
        .start(&mut session, &mut StdRng::seed_from_u64(1), now)
        .unwrap();

    while engine.phase() != Phase::Completed {
        let correct = match engine.sequence().and_then(|s| s.get(engine.index())) {
            Some(Stimulus::Congruence(item)) => item.correct,
            other => panic!("unexpected stimulus {other:?}"),
        };
        now += ms(450);
        let key = if correct { 'z' } else { 'x' };
        assert!(matches!(engine.on_key(key, now), KeyOutcome::Recorded(r) if r.correct));
        now += ms(2000);
        engine.on_tick(&mut session, now);
    }

    match engine.outcome() {
        Some(RunOutcome::Judged(Some(summary))) => {
            assert_eq!(summary.incorrect, 0);
            assert_eq!(summary.average_time_ms, 450.0);
            assert_eq!(summary.label, PerformanceLabel::Supersonic);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}

#[test]
fn stop_and_restart_never_leaks_old_timers() {
    let mut session = SessionState::new(Level::MAX, ExerciseId::Eo2);
    let mut engine = Engine::new(ExerciseId::Eo2, JudgmentKeys::default());
    let mut rng = StdRng::seed_from_u64(9);
    let t0 = Instant::now();

    engine.start(&mut session, &mut rng, t0).unwrap();
    engine.on_tick(&mut session, t0 + ms(300));
    assert_eq!(engine.index(), 1);

    engine.stop(&mut session);
    let t1 = t0 + ms(450);
    engine.start(&mut session, &mut rng, t1).unwrap();

    // old schedule would have advanced at t0+600
    engine.on_tick(&mut session, t0 + ms(600));
    assert_eq!(engine.index(), 0);
    engine.on_tick(&mut session, t1 + ms(300));
    assert_eq!(engine.index(), 1);
}

#[test]
fn keys_during_feedback_and_after_completion_are_ignored() {
    let mut session = SessionState::new(Level::MAX, ExerciseId::Epm1);
    let mut engine = Engine::new(ExerciseId::Epm1, JudgmentKeys::default());
    let mut now = Instant::now();
    engine
        .start(&mut session, &mut StdRng::seed_from_u64(4), now)
        .unwrap();

    for _ in 0..10 {
        now += ms(100);
        engine.on_key('z', now);
        assert_eq!(engine.on_key('z', now + ms(1)), KeyOutcome::Ignored);
        now += ms(2000);
        engine.on_tick(&mut session, now);
    }
    assert_eq!(engine.phase(), Phase::Completed);
    assert_eq!(engine.responses().len(), 10);
    assert_eq!(engine.on_key('x', now), KeyOutcome::Ignored);
}

#[test]
fn restarted_judgment_run_scores_only_its_own_answers() {
    let mut session = SessionState::new(Level::MAX, ExerciseId::Epm2);
    let mut engine = Engine::new(ExerciseId::Epm2, JudgmentKeys::default());
    let mut rng = StdRng::seed_from_u64(5);
    let mut now = Instant::now();

    let current_is_correct = |engine: &Engine| match engine.sequence().and_then(|s| s.get(engine.index())) {
        Some(Stimulus::Congruence(item)) => item.correct,
        other => panic!("unexpected stimulus {other:?}"),
    };

    // two wrong answers, then abort
    engine.start(&mut session, &mut rng, now).unwrap();
    for _ in 0..2 {
        let wrong = if current_is_correct(&engine) { 'x' } else { 'z' };
        now += ms(300);
        assert!(matches!(engine.on_key(wrong, now), KeyOutcome::Recorded(r) if !r.correct));
        now += ms(2000);
        engine.on_tick(&mut session, now);
    }
    assert_eq!(engine.responses().len(), 2);
    engine.stop(&mut session);
    assert!(engine.responses().is_empty());

    // full run: only the first answer is wrong
    engine.start(&mut session, &mut rng, now).unwrap();
    let mut first = true;
    while engine.phase() != Phase::Completed {
        let correct = current_is_correct(&engine);
        let key = if correct != first { 'z' } else { 'x' };
        first = false;
        now += ms(300);
        engine.on_key(key, now);
        now += ms(2000);
        engine.on_tick(&mut session, now);
    }

    match engine.outcome() {
        Some(RunOutcome::Judged(Some(summary))) => {
            assert_eq!(summary.total, 10);
            assert_eq!(summary.incorrect, 1);
            assert_eq!(summary.average_time_ms, 300.0);
            assert_eq!(summary.error_penalty_ms, 200.0);
            assert_eq!(summary.scored_time_ms, 500.0);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}
