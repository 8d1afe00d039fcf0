pub mod manual;
pub mod pacer;
pub mod timer;

pub use manual::ManualTimer;
pub use pacer::FramePacer;
pub use timer::{FrameStats, HighPrecisionTimer, Timer};
