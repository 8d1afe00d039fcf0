pub mod input;
pub mod participant;
pub mod phase;
pub mod stimulus;
pub mod trial;

pub use input::Key;
pub use participant::{Gender, ParseGenderError, Participant};
pub use phase::{DetectionPhase, Phase, StroopPhase};
pub use stimulus::{BLACK, GREY, InkColor, Rgba, Stimulus, WHITE};
pub use trial::{
    Condition, DetectionRecord, DetectionSpec, PrimeType, Record, StroopType, TrialRecord,
    TrialSpec, TrialType,
};
