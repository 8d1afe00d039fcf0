pub mod config;
pub mod detection;
pub mod error;
pub mod generator;
pub mod sequence;
pub mod sink;
pub mod stroop;
pub mod summary;

pub use config::{DetectionConfig, ExperimentConfig, ResponseKeys, StroopConfig, StroopTiming};
pub use detection::DetectionSession;
pub use error::{ExperimentError, Result};
pub use sequence::{Hold, KeyPress, Response, Step, StepSequence};
pub use sink::{RecordSink, TsvSink, timestamped_path};
pub use stroop::StroopSession;
pub use summary::Summary;

use stroop_core::{Key, Phase, Rgba, Stimulus};

/// A running session as seen by the display loop.
///
/// Each frame the loop draws [`Experiment::stimulus`], then calls
/// [`Experiment::presented`] and [`Experiment::update`]. Key presses go to
/// [`Experiment::handle_key`] as they arrive.
pub trait Experiment {
    type Phase: Phase;

    fn phase(&self) -> Self::Phase;

    fn stimulus(&self) -> &Stimulus;

    fn background(&self) -> Rgba;

    /// The current stimulus has reached the screen
    fn presented(&mut self);

    fn update(&mut self) -> Result<()>;

    fn handle_key(&mut self, key: Key) -> Result<()>;

    /// The screen stays as it is until a key arrives
    fn is_awaiting_key(&self) -> bool;

    fn is_finished(&self) -> bool {
        self.phase().is_finished()
    }
}
