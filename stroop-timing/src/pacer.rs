use crate::timer::Timer;
use std::time::Duration;

/// Caps the redraw loop at the display rate when presenting does not block
/// on vsync. Wakes `slack` early so a blocking present still sets the pace.
#[derive(Debug, Clone)]
pub struct FramePacer {
    interval: Duration,
    slack: Duration,
    last_ns: Option<u64>,
}

impl FramePacer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            slack: Duration::from_millis(1),
            last_ns: None,
        }
    }

    pub fn from_refresh_hz(hz: f64) -> Self {
        let hz = if hz.is_finite() && hz > 0.0 { hz } else { 60.0 };
        Self::new(Duration::from_secs_f64(1.0 / hz))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleeps out what is left of the current frame interval, then starts
    /// the next one.
    pub fn wait<T: Timer>(&mut self, timer: &T) {
        if let Some(last) = self.last_ns {
            let budget = self.interval.saturating_sub(self.slack).as_nanos() as u64;
            let deadline = last.saturating_add(budget);
            let now = timer.now();
            if deadline > now {
                timer.sleep(Duration::from_nanos(deadline - now));
            }
        }
        self.last_ns = Some(timer.now());
    }
}
