//! Masked-prime Stroop session: welcome, practice, blocks, summary.

use crate::Experiment;
use crate::config::StroopConfig;
use crate::error::Result;
use crate::generator::{generate_block_trials, generate_practice_trials, random_mask};
use crate::sequence::{Response, Step, StepSequence};
use crate::sink::RecordSink;
use crate::summary::Summary;
use rand::Rng;
use std::path::{Path, PathBuf};
use std::time::Duration;
use stroop_core::{
    GREY, InkColor, Key, Participant, Rgba, Stimulus, StroopPhase, TrialRecord, TrialSpec,
    TrialType, WHITE,
};
use stroop_timing::Timer;
use tracing::{info, warn};

/// A trial on screen: its spec and the steps left to show
struct ActiveTrial {
    spec: TrialSpec,
    steps: StepSequence,
}

pub struct StroopSession<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink<TrialRecord>,
{
    config: StroopConfig,
    participant: Participant,
    timer: T,
    rng: R,
    sink: S,
    output_path: Option<PathBuf>,
    phase: StroopPhase,
    screen: Stimulus,
    trials: Vec<TrialSpec>,
    next_trial: usize,
    current: Option<ActiveTrial>,
    practice_correct: usize,
    practice_total: usize,
    records: Vec<TrialRecord>,
}

impl<T, R, S> StroopSession<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink<TrialRecord>,
{
    pub fn new(
        config: StroopConfig,
        participant: Participant,
        timer: T,
        rng: R,
        sink: S,
    ) -> Result<Self> {
        config.validate()?;
        let screen = Stimulus::message(
            welcome_text(&config),
            config.message_height,
            config.wrap_width,
        );
        Ok(Self {
            config,
            participant,
            timer,
            rng,
            sink,
            output_path: None,
            phase: StroopPhase::Welcome,
            screen,
            trials: Vec::new(),
            next_trial: 0,
            current: None,
            practice_correct: 0,
            practice_total: 0,
            records: Vec::new(),
        })
    }

    /// Path shown on the summary screen
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    pub fn output_path(&self) -> Option<&Path> {
        self.output_path.as_deref()
    }

    pub fn records(&self) -> &[TrialRecord] {
        &self.records
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn current_trial(&self) -> Option<&TrialSpec> {
        self.current.as_ref().map(|t| &t.spec)
    }

    /// (correct, total) over the practice round
    pub fn practice_score(&self) -> (usize, usize) {
        (self.practice_correct, self.practice_total)
    }

    pub fn summary(&self) -> Option<Summary> {
        Summary::from_records(&self.records)
    }

    pub fn config(&self) -> &StroopConfig {
        &self.config
    }

    fn show_message(&mut self, phase: StroopPhase, text: String) {
        self.current = None;
        self.phase = phase;
        self.screen = Stimulus::message(text, self.config.message_height, self.config.wrap_width);
        info!(phase = %phase, "phase changed");
    }

    fn start_practice(&mut self) {
        self.trials = generate_practice_trials(&mut self.rng);
        self.next_trial = 0;
        self.practice_correct = 0;
        self.practice_total = self.trials.len();
        self.phase = StroopPhase::Practice;
        info!(trials = self.trials.len(), "starting practice round");
        self.start_next_trial();
    }

    fn start_block(&mut self, block: u32) -> Result<()> {
        if block > self.config.blocks {
            self.complete();
            return Ok(());
        }
        self.trials = generate_block_trials(block, &self.config, &mut self.rng)?;
        self.next_trial = 0;
        self.phase = StroopPhase::Block(block);
        info!(block, of = self.config.blocks, trials = self.trials.len(), "starting block");
        self.start_next_trial();
        Ok(())
    }

    fn start_next_trial(&mut self) {
        let Some(spec) = self.trials.get(self.next_trial).cloned() else {
            self.end_of_trials();
            return;
        };
        self.next_trial += 1;
        let steps = trial_steps(&spec, &self.config, &mut self.rng);
        self.current = Some(ActiveTrial {
            spec,
            steps: StepSequence::new(steps),
        });
    }

    fn end_of_trials(&mut self) {
        match self.phase {
            StroopPhase::Practice => {
                let text = practice_feedback_text(
                    &self.config,
                    self.practice_correct,
                    self.practice_total,
                );
                self.show_message(StroopPhase::PracticeFeedback, text);
            }
            StroopPhase::Block(block) if block < self.config.blocks => {
                let next = block + 1;
                let text = block_break_text(&self.config, next);
                self.show_message(StroopPhase::BlockBreak(next), text);
            }
            _ => self.complete(),
        }
    }

    fn complete(&mut self) {
        let text = completion_text(self.summary().as_ref(), self.output_path.as_deref());
        if let Some(summary) = self.summary() {
            info!(
                trials = summary.total_trials,
                accuracy = summary.accuracy_pct,
                mean_rt = summary.mean_rt,
                mean_rt_correct = summary.mean_rt_correct,
                "experiment completed"
            );
        }
        self.show_message(StroopPhase::Complete, text);
    }

    fn terminate(&mut self) {
        warn!(
            phase = %self.phase,
            recorded = self.records.len(),
            "experiment terminated early"
        );
        self.show_message(StroopPhase::Terminated, TERMINATED_TEXT.to_string());
    }

    fn finish_trial(&mut self) -> Result<()> {
        let Some(trial) = self.current.take() else {
            return Ok(());
        };
        let spec = trial.spec;

        let (response, reaction_time, correct) = match trial.steps.response() {
            Some(Response::Key(press)) if press.key.is_escape() => {
                self.terminate();
                return Ok(());
            }
            Some(Response::Key(press)) => (
                Some(press.key.to_string()),
                Some(press.latency.as_secs_f64()),
                self.config.keys.color_for(press.key) == Some(spec.color),
            ),
            Some(Response::TimedOut) | None => (None, None, false),
        };

        let record = TrialRecord::new(&self.participant, &spec, response, reaction_time, correct);
        info!(
            block = spec.block_num,
            trial = spec.trial_num,
            trial_type = %spec.trial_type,
            target = spec.target_word().unwrap_or("COLOR_BLOCK"),
            color = %spec.color,
            response = record.response.as_deref().unwrap_or("-"),
            rt = ?reaction_time,
            correct,
            "trial complete"
        );

        if spec.is_practice {
            if correct {
                self.practice_correct += 1;
            }
        } else {
            self.sink.append(&record)?;
            self.records.push(record);
        }

        self.start_next_trial();
        Ok(())
    }
}

impl<T, R, S> Experiment for StroopSession<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink<TrialRecord>,
{
    type Phase = StroopPhase;

    fn phase(&self) -> StroopPhase {
        self.phase
    }

    fn stimulus(&self) -> &Stimulus {
        match &self.current {
            Some(trial) => trial.steps.stimulus(),
            None => &self.screen,
        }
    }

    fn background(&self) -> Rgba {
        GREY
    }

    fn presented(&mut self) {
        let now = self.timer.now();
        if let Some(trial) = &mut self.current {
            trial.steps.mark_presented(now);
        }
    }

    fn update(&mut self) -> Result<()> {
        let now = self.timer.now();
        let Some(trial) = &mut self.current else {
            return Ok(());
        };
        trial.steps.update(now);
        if trial.steps.is_finished() {
            self.finish_trial()?;
        }
        Ok(())
    }

    fn handle_key(&mut self, key: Key) -> Result<()> {
        match self.phase {
            StroopPhase::Welcome => match key {
                Key::Space => self.start_practice(),
                Key::Escape => {
                    info!("quit from welcome screen");
                    self.phase = StroopPhase::Finished;
                }
                _ => {}
            },
            StroopPhase::Practice | StroopPhase::Block(_) => {
                let now = self.timer.now();
                if let Some(trial) = &mut self.current {
                    trial.steps.key(key, now);
                }
            }
            StroopPhase::PracticeFeedback => match key {
                Key::Space => self.start_block(1)?,
                Key::Escape => self.terminate(),
                _ => {}
            },
            StroopPhase::BlockBreak(block) => match key {
                Key::Space => self.start_block(block)?,
                Key::Escape => self.terminate(),
                _ => {}
            },
            StroopPhase::Complete | StroopPhase::Terminated => {
                self.phase = StroopPhase::Finished;
                info!("session finished");
            }
            StroopPhase::Finished => {}
        }
        Ok(())
    }

    fn is_awaiting_key(&self) -> bool {
        match self.phase {
            StroopPhase::Practice | StroopPhase::Block(_) => self
                .current
                .as_ref()
                .is_some_and(|t| t.steps.is_awaiting_key()),
            StroopPhase::Finished => false,
            _ => true,
        }
    }
}

/// fixation → mask → prime (if any) → mask → target → blank
fn trial_steps<R: Rng + ?Sized>(spec: &TrialSpec, config: &StroopConfig, rng: &mut R) -> Vec<Step> {
    let timing = &config.timing;
    let height = config.stimulus_height;
    let ms = Duration::from_millis;

    let mut steps = vec![
        Step::timed(
            Stimulus::Fixation {
                size: height,
                color: WHITE,
            },
            ms(timing.fixation_ms),
        ),
        Step::timed(Stimulus::text(random_mask(rng), height, WHITE), ms(timing.mask_ms)),
    ];
    let prime = spec.prime_word();
    if !prime.is_empty() {
        steps.push(Step::timed(Stimulus::text(prime, height, WHITE), ms(timing.prime_ms)));
    }
    steps.push(Step::timed(
        Stimulus::text(random_mask(rng), height, WHITE),
        ms(timing.mask_ms),
    ));
    steps.push(Step::until_key(
        target_stimulus(spec, config),
        config.keys.response_set(),
        timing.response_timeout(),
    ));
    steps.push(Step::timed(Stimulus::Blank, ms(timing.blank_ms)));
    steps
}

fn target_stimulus(spec: &TrialSpec, config: &StroopConfig) -> Stimulus {
    let color = spec.target_color().rgba();
    match (spec.trial_type, spec.target_word()) {
        (TrialType::Stroop, Some(word)) => Stimulus::text(word, config.stimulus_height, color),
        _ => {
            let (width, height) = config.color_block_size;
            Stimulus::ColorBlock {
                width,
                height,
                color,
            }
        }
    }
}

fn key_reminder(config: &StroopConfig) -> String {
    let green = config.keys.key_for(InkColor::Green).to_string().to_uppercase();
    let red = config.keys.key_for(InkColor::Red).to_string().to_uppercase();
    format!(
        "- Press '{green}' for GREEN words/blocks\n- Press '{red}' for RED words/blocks\n- Press 'ESC' to exit"
    )
}

fn welcome_text(config: &StroopConfig) -> String {
    format!(
        "Welcome to the Experiment!\n\n\
         In this experiment, you will see either colored words or colored blocks on the screen.\n\
         Your task is to identify the COLOR that word/block is displayed in.\n\n\
         Instructions:\n{}\n- Respond as quickly and accurately as possible\n\n\
         First, you will complete a short practice round.\n\
         The experiment will begin after that.\n\
         There will be {} blocks with {} trials each.\n\
         Feel free to take short breaks between blocks.\n\n\
         Press SPACEBAR to begin the practice round.",
        key_reminder(config),
        config.blocks,
        config.trials_per_block(),
    )
}

fn practice_feedback_text(config: &StroopConfig, correct: usize, total: usize) -> String {
    let accuracy = if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    };
    format!(
        "Practice Round Complete!\n\n\
         You got {correct} out of {total} correct ({accuracy:.1}% accuracy).\n\n\
         Remember:\n{}\n- Respond as quickly and accurately as possible\n\n\
         Press SPACEBAR to begin the main experiment.",
        key_reminder(config),
    )
}

fn block_break_text(config: &StroopConfig, block: u32) -> String {
    format!(
        "Starting block {block} of {}\n\n\
         Take a short break if needed.\n\
         Remember:\n{}\n\n\
         Press SPACEBAR to continue.",
        config.blocks,
        key_reminder(config),
    )
}

fn completion_text(summary: Option<&Summary>, path: Option<&Path>) -> String {
    let saved = match path {
        Some(path) => format!("Your data has been saved to: {}", path.display()),
        None => "Your data has been saved.".to_string(),
    };
    match summary {
        Some(s) => format!(
            "Experiment Completed!\n\n\
             Your Performance:\n\
             - Total Trials: {}\n\
             - Accuracy: {:.1}%\n\
             - Average Reaction Time (Overall): {:.3} seconds\n\
             - Average Reaction Time (Correct Only): {:.3} seconds\n\n\
             Thank you for participating in this experiment!\n\
             {saved}\n\n\
             Press any key to exit.",
            s.total_trials, s.accuracy_pct, s.mean_rt, s.mean_rt_correct,
        ),
        None => format!(
            "Experiment Completed!\n\n\
             Thank you for participating in this experiment!\n\
             {saved}\n\n\
             Press any key to exit."
        ),
    }
}

const TERMINATED_TEXT: &str = "Experiment terminated.\n\nThank you for your time!\n\nPress any key to exit.";

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use stroop_core::{Condition, PrimeType, StroopType};
    use stroop_timing::ManualTimer;

    fn spec(trial_type: TrialType, prime_type: PrimeType, practice: bool) -> TrialSpec {
        TrialSpec::from_condition(
            Condition::new(trial_type, prime_type, StroopType::Incongruent, InkColor::Green),
            1,
            1,
            practice,
        )
    }

    fn session() -> (StroopSession<ManualTimer, StdRng, Vec<TrialRecord>>, ManualTimer) {
        let timer = ManualTimer::new();
        let session = StroopSession::new(
            StroopConfig::default(),
            Participant::default(),
            timer.clone(),
            StdRng::seed_from_u64(1),
            Vec::new(),
        )
        .unwrap();
        (session, timer)
    }

    #[test]
    fn primed_trial_has_six_steps() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = StroopConfig::default();
        let steps = trial_steps(&spec(TrialType::Stroop, PrimeType::Congruent, false), &config, &mut rng);
        assert_eq!(steps.len(), 6);
        assert_eq!(steps[2].stimulus, Stimulus::text("GREEN", 60.0, WHITE));
        assert_eq!(
            steps[4].stimulus,
            Stimulus::text("RED", 60.0, InkColor::Green.rgba())
        );
        assert_eq!(steps[5].stimulus, Stimulus::Blank);
    }

    #[test]
    fn unprimed_trial_skips_prime_step() {
        let mut rng = StdRng::seed_from_u64(0);
        let config = StroopConfig::default();
        let neutral = trial_steps(&spec(TrialType::Stroop, PrimeType::Neutral, false), &config, &mut rng);
        assert_eq!(neutral.len(), 5);
        let practice = trial_steps(&spec(TrialType::Stroop, PrimeType::Congruent, true), &config, &mut rng);
        assert_eq!(practice.len(), 5);
    }

    #[test]
    fn color_block_target_is_a_rectangle() {
        let config = StroopConfig::default();
        let target = target_stimulus(&spec(TrialType::ColorBlock, PrimeType::Neutral, false), &config);
        assert_eq!(
            target,
            Stimulus::ColorBlock {
                width: 200.0,
                height: 100.0,
                color: InkColor::Green.rgba(),
            }
        );
    }

    #[test]
    fn escape_on_welcome_quits_without_a_screen() {
        let (mut session, _) = session();
        assert!(session.is_awaiting_key());
        session.handle_key(Key::Char('z')).unwrap();
        assert_eq!(session.phase(), StroopPhase::Welcome);
        session.handle_key(Key::Escape).unwrap();
        assert!(session.is_finished());
    }

    #[test]
    fn space_starts_practice_with_fixation() {
        let (mut session, _) = session();
        session.handle_key(Key::Space).unwrap();
        assert_eq!(session.phase(), StroopPhase::Practice);
        assert!(matches!(session.stimulus(), Stimulus::Fixation { .. }));
        assert!(!session.is_awaiting_key());
        assert_eq!(session.current_trial().map(|t| t.is_practice), Some(true));
    }

    #[test]
    fn correct_key_depends_on_ink_color_only() {
        let (mut session, timer) = session();
        session.handle_key(Key::Space).unwrap();

        while !session.is_awaiting_key() {
            session.presented();
            timer.advance(Duration::from_millis(10));
            session.update().unwrap();
        }
        session.presented();
        let color = session.current_trial().unwrap().color;
        timer.advance(Duration::from_millis(420));
        session.handle_key(session.config().keys.key_for(color)).unwrap();

        // blank, then the next practice trial starts
        while session.practice_score().0 == 0 {
            session.presented();
            timer.advance(Duration::from_millis(10));
            session.update().unwrap();
        }
        assert_eq!(session.practice_score(), (1, 5));
        assert!(session.records().is_empty());
        assert!(session.sink().is_empty());
    }

    #[test]
    fn completion_text_without_statistics() {
        let text = completion_text(None, None);
        assert!(text.starts_with("Experiment Completed!"));
        assert!(!text.contains("Accuracy"));
    }

    #[test]
    fn completion_text_with_statistics() {
        let summary = Summary {
            total_trials: 60,
            correct_trials: 45,
            accuracy_pct: 75.0,
            mean_rt: 0.6123,
            mean_rt_correct: 0.5,
        };
        let text = completion_text(Some(&summary), Some(Path::new("out.tsv")));
        assert!(text.contains("- Total Trials: 60"));
        assert!(text.contains("- Accuracy: 75.0%"));
        assert!(text.contains("(Overall): 0.612 seconds"));
        assert!(text.contains("saved to: out.tsv"));
    }

    #[test]
    fn welcome_text_uses_configured_keys() {
        let mut config = StroopConfig::default();
        config.keys.green = 'f';
        config.keys.red = 'j';
        let text = welcome_text(&config);
        assert!(text.contains("Press 'F' for GREEN"));
        assert!(text.contains("Press 'J' for RED"));
        assert!(text.contains("8 blocks with 60 trials"));
    }
}
