use std::time::{Duration, Instant};

/// Monotonic clock in nanoseconds since the timer was created
pub trait Timer: Clone {
    fn now(&self) -> u64;

    fn elapsed(&self, since: u64) -> Duration {
        Duration::from_nanos(self.now().saturating_sub(since))
    }

    fn sleep(&self, d: Duration);
}

/// Summary of recorded frame durations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub frames: usize,
    pub average_frame_time_ns: f64,
    pub jitter_ns: f64,
    pub min_frame_time_ns: f64,
    pub max_frame_time_ns: f64,
    pub effective_fps: f64,
}

impl FrameStats {
    pub fn from_durations(durations: &[Duration]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }
        let times: Vec<f64> = durations.iter().map(|d| d.as_nanos() as f64).collect();
        let avg = times.iter().sum::<f64>() / times.len() as f64;
        let var = times.iter().map(|x| (x - avg).powi(2)).sum::<f64>() / times.len() as f64;
        let min = times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            frames: times.len(),
            average_frame_time_ns: avg,
            jitter_ns: var.sqrt(),
            min_frame_time_ns: min,
            max_frame_time_ns: max,
            effective_fps: if avg > 0.0 { 1e9 / avg } else { 0.0 },
        }
    }
}

#[derive(Debug, Clone)]
pub struct HighPrecisionTimer {
    start: Instant,
    frame_times: Vec<Duration>,
    max_samples: usize,
}

impl Timer for HighPrecisionTimer {
    fn now(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }

    fn sleep(&self, d: Duration) {
        self.high_precision_sleep(d)
    }
}

impl HighPrecisionTimer {
    pub fn new() -> Self {
        Self::with_capacity(1000)
    }

    pub fn with_capacity(max_samples: usize) -> Self {
        Self {
            start: Instant::now(),
            frame_times: Vec::with_capacity(max_samples),
            max_samples,
        }
    }

    /// Keeps the most recent `max_samples` frame durations
    pub fn record_frame(&mut self, d: Duration) {
        if self.max_samples == 0 {
            return;
        }
        if self.frame_times.len() >= self.max_samples {
            self.frame_times.remove(0);
        }
        self.frame_times.push(d);
    }

    pub fn frame_stats(&self) -> FrameStats {
        FrameStats::from_durations(&self.frame_times)
    }

    pub fn high_precision_sleep(&self, duration: Duration) {
        #[cfg(target_os = "linux")]
        self.linux_sleep(duration);
        #[cfg(not(target_os = "linux"))]
        std::thread::sleep(duration);
    }

    #[cfg(target_os = "linux")]
    fn linux_sleep(&self, duration: Duration) {
        use libc::{CLOCK_MONOTONIC, clock_nanosleep, timespec};

        let req = timespec {
            tv_sec: duration.as_secs() as libc::time_t,
            tv_nsec: duration.subsec_nanos() as libc::c_long,
        };

        // SAFETY: `req` is a valid timespec and the remainder pointer may be null.
        unsafe {
            clock_nanosleep(CLOCK_MONOTONIC, 0, &req, std::ptr::null_mut());
        }
    }
}

impl Default for HighPrecisionTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_monotonic() {
        let timer = HighPrecisionTimer::new();
        let a = timer.now();
        timer.sleep(Duration::from_millis(2));
        let b = timer.now();
        assert!(b >= a + 1_000_000);
        assert!(timer.elapsed(a) >= Duration::from_millis(2));
    }

    #[test]
    fn frame_buffer_is_bounded() {
        let mut timer = HighPrecisionTimer::with_capacity(3);
        for ms in 1..=5 {
            timer.record_frame(Duration::from_millis(ms));
        }
        let stats = timer.frame_stats();
        assert_eq!(stats.frames, 3);
        assert_eq!(stats.min_frame_time_ns, 3_000_000.0);
        assert_eq!(stats.max_frame_time_ns, 5_000_000.0);
    }

    #[test]
    fn stats_for_steady_frames() {
        let frames = vec![Duration::from_millis(10); 4];
        let stats = FrameStats::from_durations(&frames);
        assert_eq!(stats.average_frame_time_ns, 10_000_000.0);
        assert_eq!(stats.jitter_ns, 0.0);
        assert!((stats.effective_fps - 100.0).abs() < 1e-9);
    }

    #[test]
    fn empty_stats_are_zero() {
        assert_eq!(FrameStats::from_durations(&[]), FrameStats::default());
    }
}
