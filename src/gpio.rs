use std::fmt;
use std::time::Duration;

use rustc_hash::FxHashMap;

use crate::config::EdgeMode;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
    Unknown,
}

impl Level {
    pub fn parse(bytes: &[u8]) -> Self {
        match bytes {
            [b'0', b'\n'] => Level::Low,
            [b'1', b'\n'] => Level::High,
            _ => Level::Unknown,
        }
    }

    pub fn as_digit(&self) -> Option<u8> {
        match self {
            Level::Low => Some(0),
            Level::High => Some(1),
            Level::Unknown => None,
        }
    }
}

impl EdgeMode {
    pub fn admits(&self, level: Level) -> bool {
        match (self, level) {
            (_, Level::Unknown) => false,
            (EdgeMode::Both, _) => true,
            (EdgeMode::Rising, Level::High) => true,
            (EdgeMode::Falling, Level::Low) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeEvent {
    pub pin_id: u32,
    pub state: u8,
    pub mode: EdgeMode,
}

impl fmt::Display for EdgeEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            EdgeMode::Both => write!(f, "{} {}", self.pin_id, self.state),
            // the state is implied by the mode
            EdgeMode::Rising | EdgeMode::Falling => write!(f, "{}", self.pin_id),
        }
    }
}

// line offset -> watched position; the first listing of a pin wins
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    positions: FxHashMap<u32, usize>,
}

impl LineIndex {
    pub fn new(pins: &[u32]) -> Self {
        let mut positions = FxHashMap::default();
        for (i, pin_id) in pins.iter().enumerate() {
            positions.entry(*pin_id).or_insert(i);
        }
        Self { positions }
    }

    pub fn position(&self, pin_id: u32) -> Option<usize> {
        self.positions.get(&pin_id).copied()
    }

    pub fn ready<I: IntoIterator<Item = u32>>(&self, offsets: I) -> Vec<usize> {
        let mut ready = Vec::new();
        for offset in offsets {
            if let Some(i) = self.position(offset)
                && !ready.contains(&i)
            {
                ready.push(i);
            }
        }
        ready
    }
}

pub trait GpioBackend {
    type Watch: EdgeWatch;

    fn export(&self, pin_id: u32) -> Result<(), AppError>;
    fn unexport(&self, pin_id: u32) -> Result<(), AppError>;
    fn watch(&self, pins: &[u32]) -> Result<Self::Watch, AppError>;
}

pub trait EdgeWatch {
    // indices into the watched pin list; an interrupted wait returns none
    fn wait(&mut self, timeout: Duration) -> Result<Vec<usize>, AppError>;

    fn read_level(&self, pin_id: u32) -> Level;
}
