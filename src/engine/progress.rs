use std::time::Duration;

/// Single-shot timer handle for one story position.
///
/// A handle is never restarted or rewound. Pausing drops it; resuming
/// acquires a fresh one seeded with the progress already made, so it only
/// runs for the remaining share of the duration.
#[derive(Debug)]
pub(crate) struct ProgressClock {
    started_at: Duration,
    ends_at: Duration,
    seed: f64,
    duration: Duration,
}

impl ProgressClock {
    pub(crate) fn start(now: Duration, duration: Duration, seed: f64) -> Self {
        let seed = seed.clamp(0.0, 1.0);
        Self {
            started_at: now,
            ends_at: now + duration.mul_f64(1.0 - seed),
            seed,
            duration,
        }
    }

    pub(crate) fn fraction(&self, now: Duration) -> f64 {
        if now >= self.ends_at || self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_sub(self.started_at);
        let gained = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        (self.seed + gained).min(1.0)
    }

    pub(crate) fn remaining(&self, now: Duration) -> Duration {
        self.ends_at.saturating_sub(now)
    }
}
