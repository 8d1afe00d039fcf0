mod common;

use common::{read_rows, run_until_key};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::path::Path;
use std::time::Duration;
use stroop_core::{Gender, Key, Participant, Record, Stimulus, StroopPhase, TrialRecord};
use stroop_experiment::{Experiment, StroopConfig, StroopSession, StroopTiming, TsvSink};
use stroop_timing::ManualTimer;

type Session = StroopSession<ManualTimer, StdRng, TsvSink<File>>;

fn start(config: StroopConfig, path: &Path, seed: u64) -> (Session, ManualTimer) {
    let timer = ManualTimer::new();
    let sink = TsvSink::create::<TrialRecord>(path).unwrap();
    let session = StroopSession::new(
        config,
        Participant::new("S01", "27", Gender::Female),
        timer.clone(),
        StdRng::seed_from_u64(seed),
        sink,
    )
    .unwrap()
    .with_output_path(path);
    (session, timer)
}

/// Waits for the target, then answers after 350 ms
fn answer(session: &mut Session, timer: &ManualTimer, correct: bool) {
    run_until_key(session, timer);
    let spec = session.current_trial().expect("a trial on screen").clone();
    let color = if correct { spec.color } else { spec.color.other() };
    let key = session.config().keys.key_for(color);
    timer.advance(Duration::from_millis(350));
    session.handle_key(key).unwrap();
}

fn finish_practice(session: &mut Session, timer: &ManualTimer) {
    session.handle_key(Key::Space).unwrap();
    while session.phase() == StroopPhase::Practice {
        answer(session, timer, true);
        run_until_key(session, timer);
    }
    assert_eq!(session.phase(), StroopPhase::PracticeFeedback);
}

#[test]
fn one_block_writes_sixty_rows_and_summarizes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stroop.tsv");
    let config = StroopConfig {
        blocks: 1,
        ..StroopConfig::default()
    };
    let (mut session, timer) = start(config, &path, 42);

    finish_practice(&mut session, &timer);
    assert_eq!(session.practice_score(), (5, 5));
    assert!(session.records().is_empty(), "practice is never persisted");
    assert_eq!(read_rows(&path).len(), 1);

    session.handle_key(Key::Space).unwrap();
    assert_eq!(session.phase(), StroopPhase::Block(1));

    let mut expected_correct = 0;
    for i in 0..60 {
        let correct = i % 4 != 0;
        if correct {
            expected_correct += 1;
        }
        answer(&mut session, &timer, correct);
    }
    run_until_key(&mut session, &timer);
    assert_eq!(session.phase(), StroopPhase::Complete);

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 61);
    assert_eq!(rows[0], TrialRecord::FIELDS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    for (i, row) in rows[1..].iter().enumerate() {
        assert_eq!(row[0], "S01");
        assert_eq!(row[2], "Female");
        assert_eq!(row[3], "1");
        assert_eq!(row[4], (i + 1).to_string());
        assert!(!row[11].is_empty());
        assert_eq!(row[12], "0.35");
    }

    let summary = session.summary().unwrap();
    assert_eq!(summary.total_trials, 60);
    assert_eq!(summary.correct_trials, expected_correct);
    assert!((summary.accuracy_pct - expected_correct as f64 / 60.0 * 100.0).abs() < 1e-9);
    assert!((summary.mean_rt - 0.35).abs() < 1e-9);

    let Stimulus::Message { content, .. } = session.stimulus() else {
        panic!("summary screen expected");
    };
    assert!(content.contains("Total Trials: 60"));
    assert!(content.contains(&path.display().to_string()));

    session.handle_key(Key::Char('q')).unwrap();
    assert!(session.is_finished());
}

#[test]
fn escape_in_block_three_keeps_completed_rows_only() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("escape.tsv");
    let (mut session, timer) = start(StroopConfig::default(), &path, 7);

    finish_practice(&mut session, &timer);
    session.handle_key(Key::Space).unwrap();

    for block in 1..=2 {
        assert_eq!(session.phase(), StroopPhase::Block(block));
        for _ in 0..60 {
            answer(&mut session, &timer, true);
        }
        run_until_key(&mut session, &timer);
        assert_eq!(session.phase(), StroopPhase::BlockBreak(block + 1));
        session.handle_key(Key::Space).unwrap();
    }

    assert_eq!(session.phase(), StroopPhase::Block(3));
    for _ in 0..14 {
        answer(&mut session, &timer, true);
    }
    run_until_key(&mut session, &timer);
    assert_eq!(session.current_trial().map(|t| t.trial_num), Some(15));
    session.handle_key(Key::Escape).unwrap();
    run_until_key(&mut session, &timer);

    assert_eq!(session.phase(), StroopPhase::Terminated);
    assert_eq!(session.records().len(), 134);
    assert_eq!(read_rows(&path).len(), 135);
    assert_eq!(session.stimulus().content().map(|c| c.starts_with("Experiment terminated.")), Some(true));

    session.handle_key(Key::Space).unwrap();
    assert!(session.is_finished());
}

#[test]
fn escape_during_practice_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("practice.tsv");
    let (mut session, timer) = start(StroopConfig::default(), &path, 3);

    session.handle_key(Key::Space).unwrap();
    run_until_key(&mut session, &timer);
    session.handle_key(Key::Escape).unwrap();
    run_until_key(&mut session, &timer);

    assert_eq!(session.phase(), StroopPhase::Terminated);
    assert_eq!(read_rows(&path).len(), 1);
}

#[test]
fn escape_on_break_screen_skips_remaining_blocks() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("break.tsv");
    let config = StroopConfig {
        blocks: 2,
        ..StroopConfig::default()
    };
    let (mut session, timer) = start(config, &path, 9);

    finish_practice(&mut session, &timer);
    session.handle_key(Key::Space).unwrap();
    for _ in 0..60 {
        answer(&mut session, &timer, false);
    }
    run_until_key(&mut session, &timer);
    assert_eq!(session.phase(), StroopPhase::BlockBreak(2));

    session.handle_key(Key::Escape).unwrap();
    assert_eq!(session.phase(), StroopPhase::Terminated);
    assert_eq!(read_rows(&path).len(), 61);
    assert!(read_rows(&path)[1..].iter().all(|row| row[13] == "false"));
}

#[test]
fn timed_out_response_records_empty_response() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("timeout.tsv");
    let config = StroopConfig {
        blocks: 1,
        timing: StroopTiming {
            response_timeout_ms: Some(1_000),
            ..StroopTiming::default()
        },
        ..StroopConfig::default()
    };
    let (mut session, timer) = start(config, &path, 5);

    finish_practice(&mut session, &timer);
    session.handle_key(Key::Space).unwrap();

    // let the first target expire, answer the second
    run_until_key(&mut session, &timer);
    assert_eq!(session.current_trial().map(|t| t.trial_num), Some(1));
    timer.advance(Duration::from_millis(1_000));
    session.update().unwrap();
    answer(&mut session, &timer, true);
    // the row lands once the post-response blank is over
    run_until_key(&mut session, &timer);

    let rows = read_rows(&path);
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[1][11..], ["", "", "false"]);
    assert_eq!(rows[2][13], "true");
}

#[test]
fn no_blocks_gives_degenerate_completion() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.tsv");
    let config = StroopConfig {
        blocks: 0,
        ..StroopConfig::default()
    };
    let (mut session, timer) = start(config, &path, 1);

    finish_practice(&mut session, &timer);
    session.handle_key(Key::Space).unwrap();

    assert_eq!(session.phase(), StroopPhase::Complete);
    assert_eq!(session.summary(), None);
    let content = session.stimulus().content().unwrap();
    assert!(content.starts_with("Experiment Completed!"));
    assert!(!content.contains("Accuracy"));
}

#[test]
fn key_before_target_is_drawn_is_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("onset.tsv");
    let config = StroopConfig {
        blocks: 1,
        ..StroopConfig::default()
    };
    let (mut session, timer) = start(config, &path, 11);

    finish_practice(&mut session, &timer);
    session.handle_key(Key::Space).unwrap();

    // advance until the target becomes current, without drawing it
    loop {
        session.presented();
        timer.advance(Duration::from_millis(5));
        session.update().unwrap();
        if session.is_awaiting_key() {
            break;
        }
    }
    let spec = session.current_trial().unwrap().clone();
    let key = session.config().keys.key_for(spec.color);
    timer.advance(Duration::from_millis(8));
    session.handle_key(key).unwrap();
    assert!(session.is_awaiting_key());
    assert_eq!(session.current_trial(), Some(&spec));

    session.presented();
    timer.advance(Duration::from_millis(300));
    session.handle_key(key).unwrap();
    run_until_key(&mut session, &timer);

    assert_eq!(session.records().len(), 1);
    assert_eq!(session.records()[0].reaction_time, Some(0.3));
    assert!(session.records()[0].correct);
    let rows = read_rows(&path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1][12], "0.3");
}
