use std::time::Duration;
use stroop_core::{Key, Stimulus};
use tracing::debug;

/// How long a step stays on screen
#[derive(Debug, Clone, PartialEq)]
pub enum Hold {
    For(Duration),
    UntilKey {
        keys: Vec<Key>,
        timeout: Option<Duration>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub stimulus: Stimulus,
    pub hold: Hold,
}

impl Step {
    pub fn timed(stimulus: Stimulus, duration: Duration) -> Self {
        Self {
            stimulus,
            hold: Hold::For(duration),
        }
    }

    pub fn until_key(stimulus: Stimulus, keys: Vec<Key>, timeout: Option<Duration>) -> Self {
        Self {
            stimulus,
            hold: Hold::UntilKey { keys, timeout },
        }
    }
}

/// A key accepted by a waiting step, with its latency from step onset
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyPress {
    pub key: Key,
    pub latency: Duration,
}

/// What ended a key-waiting step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Response {
    Key(KeyPress),
    TimedOut,
}

static BLANK: Stimulus = Stimulus::Blank;

/// Runs a fixed list of steps. Hold times count from the moment a step is
/// first presented, not from when it became current.
#[derive(Debug, Clone)]
pub struct StepSequence {
    steps: Vec<Step>,
    index: usize,
    onset_ns: Option<u64>,
    response: Option<Response>,
}

impl StepSequence {
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            index: 0,
            onset_ns: None,
            response: None,
        }
    }

    pub fn current(&self) -> Option<&Step> {
        self.steps.get(self.index)
    }

    pub fn stimulus(&self) -> &Stimulus {
        self.current().map_or(&BLANK, |s| &s.stimulus)
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.steps.len()
    }

    pub fn is_awaiting_key(&self) -> bool {
        matches!(
            self.current(),
            Some(Step {
                hold: Hold::UntilKey { .. },
                ..
            })
        )
    }

    /// Response captured by the last key-waiting step, if any
    pub fn response(&self) -> Option<Response> {
        self.response
    }

    pub fn mark_presented(&mut self, now_ns: u64) {
        if self.onset_ns.is_none() && !self.is_finished() {
            self.onset_ns = Some(now_ns);
        }
    }

    /// Advances past a timed step whose hold has elapsed, or a key wait that
    /// timed out. Returns true when the current step changed.
    pub fn update(&mut self, now_ns: u64) -> bool {
        let (Some(step), Some(onset)) = (self.current(), self.onset_ns) else {
            return false;
        };
        let elapsed = Duration::from_nanos(now_ns.saturating_sub(onset));
        match &step.hold {
            Hold::For(d) if elapsed >= *d => {}
            Hold::UntilKey {
                timeout: Some(t), ..
            } if elapsed >= *t => {
                self.response = Some(Response::TimedOut);
            }
            _ => return false,
        }
        self.advance();
        true
    }

    /// Offers a key to the current step. Returns the press when the step was
    /// waiting for it and has been presented; other keys are ignored.
    pub fn key(&mut self, key: Key, now_ns: u64) -> Option<KeyPress> {
        let Some(Step {
            hold: Hold::UntilKey { keys, .. },
            ..
        }) = self.current()
        else {
            return None;
        };
        if !keys.contains(&key) {
            return None;
        }
        // nothing to respond to until the step has reached the screen
        let onset = self.onset_ns?;
        let press = KeyPress {
            key,
            latency: Duration::from_nanos(now_ns.saturating_sub(onset)),
        };
        self.response = Some(Response::Key(press));
        self.advance();
        Some(press)
    }

    fn advance(&mut self) {
        self.index += 1;
        self.onset_ns = None;
        debug!(step = self.index, total = self.steps.len(), "step advanced");
    }
}
