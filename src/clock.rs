use std::sync::atomic::{AtomicI64, Ordering};
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::warn;

pub trait Clock {
    fn wall_ms(&self) -> i64;
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn wall_ms(&self) -> i64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(d) => d.as_millis() as i64,
            Err(e) => -(e.duration().as_millis() as i64),
        }
    }

    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicI64,
}

impl ManualClock {
    pub fn new(now_ms: i64) -> Self {
        Self {
            now_ms: AtomicI64::new(now_ms),
        }
    }

    pub fn set(&self, now_ms: i64) {
        self.now_ms.store(now_ms, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms.fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn wall_ms(&self) -> i64 {
        self.now_ms.load(Ordering::SeqCst)
    }

    fn sleep(&self, duration: Duration) {
        self.advance(duration);
    }
}

#[derive(Debug, Clone)]
pub struct ClockGuard {
    epoch_ms: i64,
    threshold_ms: i64,
}

impl ClockGuard {
    pub fn new(epoch_ms: i64, threshold_secs: u64) -> Self {
        Self {
            epoch_ms,
            threshold_ms: i64::try_from(threshold_secs)
                .unwrap_or(i64::MAX)
                .saturating_mul(1000),
        }
    }

    pub fn epoch_ms(&self) -> i64 {
        self.epoch_ms
    }

    pub fn elapsed(&mut self, now_ms: i64) -> Option<i64> {
        let elapsed = now_ms.saturating_sub(self.epoch_ms);
        // a step in either direction moves the epoch and skips the tick
        if elapsed.unsigned_abs() > self.threshold_ms.unsigned_abs() {
            warn!(
                "wall clock stepped by {} s, resetting event baseline",
                elapsed / 1000
            );
            self.epoch_ms = now_ms;
            return None;
        }
        Some(elapsed)
    }
}
