use crate::timer::Timer;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Clock that only moves when told to. Clones share the same time, so a
/// driver can keep one handle and give another to a session.
#[derive(Debug, Clone, Default)]
pub struct ManualTimer {
    now_ns: Arc<AtomicU64>,
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, d: Duration) {
        self.now_ns.fetch_add(d.as_nanos() as u64, Ordering::SeqCst);
    }
}

impl Timer for ManualTimer {
    fn now(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    /// Sleeping advances the shared clock instead of blocking
    fn sleep(&self, d: Duration) {
        self.advance(d);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let driver = ManualTimer::new();
        let session = driver.clone();
        driver.advance(Duration::from_millis(71));
        assert_eq!(session.now(), 71_000_000);
        session.sleep(Duration::from_millis(29));
        assert_eq!(driver.now(), 100_000_000);
    }

    #[test]
    fn elapsed_saturates() {
        let timer = ManualTimer::new();
        timer.advance(Duration::from_nanos(5));
        assert_eq!(timer.elapsed(10), Duration::ZERO);
        assert_eq!(timer.elapsed(0), Duration::from_nanos(5));
    }
}
