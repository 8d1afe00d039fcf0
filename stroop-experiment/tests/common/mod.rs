#![allow(dead_code)]

use std::path::Path;
use std::time::Duration;
use stroop_experiment::Experiment;
use stroop_timing::ManualTimer;

/// Shows frames until the session waits for a key (or is finished)
pub fn run_until_key<E: Experiment>(session: &mut E, timer: &ManualTimer) {
    for _ in 0..100_000 {
        session.presented();
        if session.is_awaiting_key() || session.is_finished() {
            return;
        }
        timer.advance(Duration::from_millis(5));
        session.update().expect("update failed");
    }
    panic!("session never waited for a key");
}

pub fn read_rows(path: &Path) -> Vec<Vec<String>> {
    let text = std::fs::read_to_string(path).expect("output file");
    text.lines()
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect()
}
