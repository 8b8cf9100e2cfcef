//! Request pacing for the remote API.
//!
//! Enforces a minimum interval between calls and backs off when the API
//! answers 429. The interval doubles on each rejection (up to a ceiling)
//! and relaxes back toward the base after a streak of successes.

use std::thread;
use std::time::{Duration, Instant};

pub struct Pacer {
    last_call: Option<Instant>,
    current: Duration,
    base: Duration,
    max: Duration,
    streak: u32,
}

/// Successful calls in a row before the interval is halved again.
const RELAX_AFTER: u32 = 10;

impl Pacer {
    pub fn new(base: Duration) -> Self {
        Pacer {
            last_call: None,
            current: base,
            base,
            max: base * 16,
            streak: 0,
        }
    }

    pub fn from_millis(millis: u64) -> Self {
        Self::new(Duration::from_millis(millis))
    }

    /// Sleep until the current interval has elapsed since the previous call.
    /// Call before every request.
    pub fn pace(&mut self) {
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.current {
                let wait = self.current - elapsed;
                log::debug!("pacing: waiting {:.1}s", wait.as_secs_f64());
                thread::sleep(wait);
            }
        }
        self.last_call = Some(Instant::now());
    }

    /// The API pushed back (429). Double the interval.
    pub fn backoff(&mut self) {
        self.current = (self.current * 2).min(self.max);
        self.streak = 0;
        log::warn!(
            "rate limited, interval now {:.1}s",
            self.current.as_secs_f64()
        );
    }

    /// The call went through. After enough of these, halve the interval.
    pub fn settle(&mut self) {
        if self.current == self.base {
            return;
        }
        self.streak += 1;
        if self.streak >= RELAX_AFTER {
            self.current = (self.current / 2).max(self.base);
            self.streak = 0;
            log::debug!("interval relaxed to {:.1}s", self.current.as_secs_f64());
        }
    }
}
