//! Prime-detection pilot: can participants see a color word flashed
//! between two random letter strings?

use crate::Experiment;
use crate::config::DetectionConfig;
use crate::error::Result;
use crate::generator::{generate_detection_blocks, random_letters};
use crate::sequence::{Response, Step, StepSequence};
use crate::sink::RecordSink;
use rand::Rng;
use std::time::Duration;
use stroop_core::{
    BLACK, DetectionPhase, DetectionRecord, DetectionSpec, Key, Participant, Rgba, Stimulus,
    WHITE,
};
use stroop_timing::Timer;
use tracing::{info, warn};

struct ActiveTrial {
    spec: DetectionSpec,
    steps: StepSequence,
}

pub struct DetectionSession<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink<DetectionRecord>,
{
    config: DetectionConfig,
    participant: Participant,
    timer: T,
    rng: R,
    sink: S,
    phase: DetectionPhase,
    screen: Stimulus,
    blocks: Vec<Vec<DetectionSpec>>,
    next_trial: usize,
    current: Option<ActiveTrial>,
    escape_pending: bool,
    answered: usize,
}

impl<T, R, S> DetectionSession<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink<DetectionRecord>,
{
    pub fn new(
        config: DetectionConfig,
        participant: Participant,
        timer: T,
        mut rng: R,
        sink: S,
    ) -> Result<Self> {
        let blocks = generate_detection_blocks(&config, &mut rng)?;
        let screen = Stimulus::message(welcome_text(&config), config.text_height, config.wrap_width);
        Ok(Self {
            config,
            participant,
            timer,
            rng,
            sink,
            phase: DetectionPhase::Welcome,
            screen,
            blocks,
            next_trial: 0,
            current: None,
            escape_pending: false,
            answered: 0,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn current_trial(&self) -> Option<&DetectionSpec> {
        self.current.as_ref().map(|t| &t.spec)
    }

    /// Number of trials with a recorded answer
    pub fn answered(&self) -> usize {
        self.answered
    }

    pub fn blocks(&self) -> &[Vec<DetectionSpec>] {
        &self.blocks
    }

    fn show_message(&mut self, phase: DetectionPhase, text: String) {
        self.current = None;
        self.phase = phase;
        self.screen = Stimulus::message(text, self.config.text_height, self.config.wrap_width);
        info!(phase = %phase, "phase changed");
    }

    fn start_block(&mut self, block: u32) {
        if block as usize > self.blocks.len() {
            self.goodbye();
            return;
        }
        self.phase = DetectionPhase::Block(block);
        self.next_trial = 0;
        info!(block, of = self.blocks.len(), "starting block");
        self.start_next_trial();
    }

    fn start_next_trial(&mut self) {
        let DetectionPhase::Block(block) = self.phase else {
            return;
        };
        if self.escape_pending {
            warn!(block, "escape pressed, ending trials");
            self.goodbye();
            return;
        }
        let spec = self
            .blocks
            .get(block as usize - 1)
            .and_then(|b| b.get(self.next_trial))
            .copied();
        let Some(spec) = spec else {
            self.end_of_block(block);
            return;
        };
        self.next_trial += 1;
        let steps = trial_steps(&spec, &self.config, &mut self.rng);
        self.current = Some(ActiveTrial {
            spec,
            steps: StepSequence::new(steps),
        });
    }

    fn end_of_block(&mut self, block: u32) {
        let total = self.blocks.len() as u32;
        if block < total {
            let text = format!(
                "End of Block {block} of {total}\n\n\
                 Take a short break.\n\n\
                 Press SPACEBAR when ready to continue."
            );
            self.show_message(DetectionPhase::Break(block), text);
        } else {
            self.goodbye();
        }
    }

    fn goodbye(&mut self) {
        info!(answered = self.answered, "trials finished");
        self.show_message(
            DetectionPhase::Goodbye,
            "Thank you for participating!\n\nPress SPACE to exit.".to_string(),
        );
    }

    fn finish_trial(&mut self) -> Result<()> {
        let Some(trial) = self.current.take() else {
            return Ok(());
        };
        match trial.steps.response() {
            Some(Response::Key(press)) if press.key.is_escape() => {
                self.escape_pending = true;
                self.goodbye();
                return Ok(());
            }
            Some(Response::Key(press)) => {
                let record =
                    DetectionRecord::new(&self.participant, &trial.spec, press.key.to_string());
                info!(
                    block = trial.spec.block_num,
                    trial = trial.spec.trial_num,
                    prime = trial.spec.prime_word(),
                    duration_ms = trial.spec.duration_ms,
                    response = %press.key,
                    "trial complete"
                );
                self.sink.append(&record)?;
                self.answered += 1;
            }
            Some(Response::TimedOut) | None => {}
        }
        self.start_next_trial();
        Ok(())
    }
}

impl<T, R, S> Experiment for DetectionSession<T, R, S>
where
    T: Timer,
    R: Rng,
    S: RecordSink<DetectionRecord>,
{
    type Phase = DetectionPhase;

    fn phase(&self) -> DetectionPhase {
        self.phase
    }

    fn stimulus(&self) -> &Stimulus {
        match &self.current {
            Some(trial) => trial.steps.stimulus(),
            None => &self.screen,
        }
    }

    fn background(&self) -> Rgba {
        BLACK
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
            DetectionPhase::Welcome if key == Key::Space => self.start_block(1),
            DetectionPhase::Block(_) => {
                let now = self.timer.now();
                let Some(trial) = &mut self.current else {
                    return Ok(());
                };
                if trial.steps.key(key, now).is_none() {
                    if key.is_escape() {
                        // honored when the next trial would start
                        self.escape_pending = true;
                    }
                } else if trial.steps.is_finished() {
                    self.finish_trial()?;
                }
            }
            DetectionPhase::Break(block) if key == Key::Space => self.start_block(block + 1),
            DetectionPhase::Goodbye if key == Key::Space => {
                self.phase = DetectionPhase::Finished;
                info!("session finished");
            }
            _ => {}
        }
        Ok(())
    }

    fn is_awaiting_key(&self) -> bool {
        match self.phase {
            DetectionPhase::Block(_) => self
                .current
                .as_ref()
                .is_some_and(|t| t.steps.is_awaiting_key()),
            DetectionPhase::Finished => false,
            _ => true,
        }
    }
}

/// fixation → letters → prime word → letters → question
fn trial_steps<R: Rng + ?Sized>(
    spec: &DetectionSpec,
    config: &DetectionConfig,
    rng: &mut R,
) -> Vec<Step> {
    let height = config.text_height;
    let ms = Duration::from_millis;
    let letters = |rng: &mut R| Stimulus::text(random_letters(rng, config.string_length), height, WHITE);

    vec![
        Step::timed(
            Stimulus::Fixation {
                size: height,
                color: WHITE,
            },
            ms(config.fixation_ms),
        ),
        Step::timed(letters(&mut *rng), ms(config.mask_ms)),
        Step::timed(
            Stimulus::text(spec.prime_word(), height, WHITE),
            ms(spec.duration_ms),
        ),
        Step::timed(letters(&mut *rng), ms(config.mask_ms)),
        Step::until_key(
            Stimulus::message(question_text(config), height, config.wrap_width),
            config.keys.response_set(),
            None,
        ),
    ]
}

fn question_text(config: &DetectionConfig) -> String {
    format!(
        "Did you see a color word?\n\nPress '{}' for Yes, '{}' for No",
        config.keys.yes.to_ascii_uppercase(),
        config.keys.no.to_ascii_uppercase(),
    )
}

fn welcome_text(config: &DetectionConfig) -> String {
    format!(
        "Welcome to the experiment.\n\n\
         You will see some random letters with some color-words mixed in.\n\n\
         After each trial you will be asked to report if you saw a color-word.\n\n\
         Press '{}' for Yes, '{}' for No\n\n\
         Press SPACEBAR to begin.\nPress ESC to quit anytime.",
        config.keys.yes.to_ascii_uppercase(),
        config.keys.no.to_ascii_uppercase(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn trial_sequence_shows_prime_between_letter_strings() {
        let config = DetectionConfig::default();
        let spec = DetectionSpec {
            block_num: 1,
            trial_num: 1,
            duration_ms: 29,
            prime: stroop_core::InkColor::Green,
        };
        let mut rng = StdRng::seed_from_u64(4);
        let steps = trial_steps(&spec, &config, &mut rng);

        assert_eq!(steps.len(), 5);
        assert_eq!(steps[2].stimulus, Stimulus::text("GREEN", 40.0, WHITE));
        assert_eq!(steps[2].hold, crate::Hold::For(Duration::from_millis(29)));
        for i in [1, 3] {
            let text = steps[i].stimulus.content().unwrap();
            assert_eq!(text.len(), 6);
            assert!(text.chars().all(|c| c.is_ascii_uppercase()));
        }
        assert!(matches!(steps[4].hold, crate::Hold::UntilKey { timeout: None, .. }));
    }

    #[test]
    fn welcome_only_accepts_space() {
        let mut session = DetectionSession::new(
            DetectionConfig::default(),
            Participant::default(),
            stroop_timing::ManualTimer::new(),
            StdRng::seed_from_u64(2),
            Vec::new(),
        )
        .unwrap();
        session.handle_key(Key::Escape).unwrap();
        assert_eq!(session.phase(), DetectionPhase::Welcome);
        session.handle_key(Key::Space).unwrap();
        assert_eq!(session.phase(), DetectionPhase::Block(1));
        assert_eq!(session.current_trial().map(|t| t.trial_num), Some(1));
    }

    #[test]
    fn question_names_configured_keys() {
        let text = question_text(&DetectionConfig::default());
        assert!(text.contains("Press 'Z' for Yes, 'M' for No"));
    }
}
