use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::clock::ManualClock;
use crate::error::AppError;
use crate::gpio::{EdgeWatch, GpioBackend, Level, LineIndex};
use crate::shutdown::ShutdownSignal;

#[derive(Debug, Clone, Default)]
pub struct MockWake {
    pub at_ms: Option<i64>,
    pub pins: Vec<u32>,
    pub levels: Vec<(u32, Level)>,
}

impl MockWake {
    pub fn at(at_ms: i64, pin_id: u32, level: Level) -> Self {
        Self {
            at_ms: Some(at_ms),
            pins: vec![pin_id],
            levels: vec![(pin_id, level)],
        }
    }
}

#[derive(Default)]
struct MockState {
    exported: Vec<u32>,
    unexported: Vec<u32>,
    watched: Vec<u32>,
    failing: FxHashSet<u32>,
    levels: FxHashMap<u32, Level>,
    script: VecDeque<MockWake>,
    waits: usize,
}

#[derive(Clone, Default)]
pub struct MockGpioBackend {
    state: Arc<Mutex<MockState>>,
    clock: Option<Arc<ManualClock>>,
    // requested once the script runs dry
    idle_shutdown: Option<ShutdownSignal>,
}

impl MockGpioBackend {
    pub fn with_clock(mut self, clock: Arc<ManualClock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn shutdown_when_idle(mut self, signal: ShutdownSignal) -> Self {
        self.idle_shutdown = Some(signal);
        self
    }

    pub fn push_wake(&self, wake: MockWake) {
        self.state.lock().script.push_back(wake);
    }

    pub fn set_level(&self, pin_id: u32, level: Level) {
        self.state.lock().levels.insert(pin_id, level);
    }

    pub fn fail_pin(&self, pin_id: u32) {
        self.state.lock().failing.insert(pin_id);
    }

    pub fn exported(&self) -> Vec<u32> {
        self.state.lock().exported.clone()
    }

    pub fn unexported(&self) -> Vec<u32> {
        self.state.lock().unexported.clone()
    }

    pub fn waits(&self) -> usize {
        self.state.lock().waits
    }

    fn check(state: &MockState, pin_id: u32, op: &str) -> Result<(), AppError> {
        if state.failing.contains(&pin_id) {
            return Err(AppError::Gpio(format!("mock {op} of pin {pin_id} failed")));
        }
        Ok(())
    }
}

impl GpioBackend for MockGpioBackend {
    type Watch = MockWatch;

    fn export(&self, pin_id: u32) -> Result<(), AppError> {
        let mut state = self.state.lock();
        Self::check(&state, pin_id, "export")?;
        state.exported.push(pin_id);
        Ok(())
    }

    fn unexport(&self, pin_id: u32) -> Result<(), AppError> {
        let mut state = self.state.lock();
        Self::check(&state, pin_id, "unexport")?;
        state.unexported.push(pin_id);
        Ok(())
    }

    fn watch(&self, pins: &[u32]) -> Result<MockWatch, AppError> {
        let mut state = self.state.lock();
        for pin_id in pins {
            Self::check(&state, *pin_id, "open")?;
        }
        state.watched = pins.to_vec();
        Ok(MockWatch {
            backend: self.clone(),
        })
    }
}

pub struct MockWatch {
    backend: MockGpioBackend,
}

impl EdgeWatch for MockWatch {
    fn wait(&mut self, _timeout: Duration) -> Result<Vec<usize>, AppError> {
        let mut state = self.backend.state.lock();
        state.waits += 1;

        let Some(wake) = state.script.pop_front() else {
            if let Some(signal) = &self.backend.idle_shutdown {
                signal.request();
            }
            return Ok(Vec::new());
        };

        if let (Some(at_ms), Some(clock)) = (wake.at_ms, &self.backend.clock) {
            clock.set(at_ms);
        }
        for (pin_id, level) in wake.levels {
            state.levels.insert(pin_id, level);
        }

        Ok(LineIndex::new(&state.watched).ready(wake.pins))
    }

    fn read_level(&self, pin_id: u32) -> Level {
        self.backend
            .state
            .lock()
            .levels
            .get(&pin_id)
            .copied()
            .unwrap_or(Level::Unknown)
    }
}
