use stroop_core::TrialRecord;

/// End-of-session performance figures
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub total_trials: usize,
    pub correct_trials: usize,
    pub accuracy_pct: f64,
    /// Mean RT in seconds over every trial that has one
    pub mean_rt: f64,
    /// Mean RT in seconds over correct trials, 0 when none were correct
    pub mean_rt_correct: f64,
}

impl Summary {
    /// `None` when there is nothing to summarize: no records, or no record
    /// with a reaction time
    pub fn from_records(records: &[TrialRecord]) -> Option<Self> {
        let rts: Vec<f64> = records.iter().filter_map(|r| r.reaction_time).collect();
        if records.is_empty() || rts.is_empty() {
            return None;
        }
        let correct: Vec<&TrialRecord> = records.iter().filter(|r| r.correct).collect();
        let correct_rts: Vec<f64> = correct.iter().filter_map(|r| r.reaction_time).collect();

        Some(Self {
            total_trials: records.len(),
            correct_trials: correct.len(),
            accuracy_pct: correct.len() as f64 / records.len() as f64 * 100.0,
            mean_rt: mean(&rts),
            mean_rt_correct: if correct_rts.is_empty() {
                0.0
            } else {
                mean(&correct_rts)
            },
        })
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
