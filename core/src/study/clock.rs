//! Monotonic time, pause accounting and trial stopwatches
//!
//! All sequencer time is a monotonic offset (`Duration`) from an arbitrary
//! origin supplied by a [`Clock`]. Pausing never touches sequencer state; it
//! only accumulates paused time, which trial stopwatches subtract from the
//! wall-clock interval they measure.
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

/// Source of monotonic time
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall clock backed by `Instant`
#[derive(Debug, Clone)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        self.millis.store(at.as_millis() as u64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Keys that dismiss the pause overlay
pub fn is_resume_key(key: &str) -> bool {
    matches!(key, "Escape" | " " | "Enter")
}

/// Study-wide pause flag with accumulated paused time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PauseClock {
    paused_since: Option<Duration>,
    accumulated: Duration,
}

impl PauseClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused_since.is_some()
    }

    /// Enter the paused state; `false` if already paused
    pub fn pause(&mut self, now: Duration) -> bool {
        if self.paused_since.is_some() {
            return false;
        }
        self.paused_since = Some(now);
        true
    }

    /// Leave the paused state; `false` if not paused
    pub fn resume(&mut self, now: Duration) -> bool {
        match self.paused_since.take() {
            Some(since) => {
                self.accumulated += now.saturating_sub(since);
                true
            }
            None => false,
        }
    }

    /// Total paused time up to `now`, including an ongoing pause
    pub fn paused_total(&self, now: Duration) -> Duration {
        let ongoing = self
            .paused_since
            .map(|since| now.saturating_sub(since))
            .unwrap_or_default();
        self.accumulated + ongoing
    }

    /// Start timing an interval at `now`
    pub fn stopwatch(&self, now: Duration) -> Stopwatch {
        Stopwatch {
            started: now,
            paused_at_start: self.paused_total(now),
        }
    }
}

/// Interval timer that excludes paused time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stopwatch {
    started: Duration,
    paused_at_start: Duration,
}

impl Stopwatch {
    pub fn started(&self) -> Duration {
        self.started
    }

    /// Active (unpaused) time between the start and `now`
    pub fn elapsed(&self, pause: &PauseClock, now: Duration) -> Duration {
        let wall = now.saturating_sub(self.started);
        let paused = pause.paused_total(now).saturating_sub(self.paused_at_start);
        wall.saturating_sub(paused)
    }
}
