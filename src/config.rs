use std::time::Duration;
use std::{fs, path::Path, path::PathBuf};

use log::warn;
use rustc_hash::FxHashSet;
use serde::Deserialize;

use crate::error::AppError;

pub const MAX_PINS: usize = 20;
// elapsed-time arithmetic is done in signed milliseconds
pub const MAX_WINDOW_MS: u64 = i64::MAX as u64;
pub const MAX_CLOCK_JUMP_SECS: u64 = MAX_WINDOW_MS / 1000;

pub const DEFAULT_PIPE_PATH: &str = "/tmp/pi-buttons";
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/gpio";
pub const DEFAULT_BOUNCE_MS: u64 = 300;
pub const DEFAULT_SETTLE_MS: u64 = 2;
pub const DEFAULT_POLL_TIMEOUT_MS: u64 = 3000;
pub const DEFAULT_STARTUP_GRACE_MS: u64 = 1000;
// A board without an RTC jumps decades when NTP first syncs.
pub const DEFAULT_CLOCK_JUMP_SECS: u64 = 31_536_000;

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeMode {
    Rising,
    Falling,
    #[default]
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Monitor,
    ExportOnly,
    UnexportOnly,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Pipe(PathBuf),
    Console,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AppConfig {
    pub pins: Vec<u32>,
    pub bounce_ms: u64,
    pub edge: EdgeMode,
    pub pipe_path: PathBuf,
    pub no_export: bool,
    pub sysfs_root: PathBuf,
    pub settle_ms: u64,
    pub poll_timeout_ms: u64,
    pub startup_grace_ms: u64,
    pub clock_jump_secs: u64,
    pub chip: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pins: Vec::new(),
            bounce_ms: DEFAULT_BOUNCE_MS,
            edge: EdgeMode::default(),
            pipe_path: PathBuf::from(DEFAULT_PIPE_PATH),
            no_export: false,
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            settle_ms: DEFAULT_SETTLE_MS,
            poll_timeout_ms: DEFAULT_POLL_TIMEOUT_MS,
            startup_grace_ms: DEFAULT_STARTUP_GRACE_MS,
            clock_jump_secs: DEFAULT_CLOCK_JUMP_SECS,
            chip: None,
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let contents = fs::read_to_string(&path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;
        serde_json::from_str(&contents)
            .map_err(|e| AppError::Config(format!("Invalid config json: {e}")))
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.pins.is_empty() {
            return Err(AppError::Config("no pins specified".into()));
        }
        if self.pins.len() > MAX_PINS {
            return Err(AppError::Config(format!(
                "too many pins specified ({}, maximum {MAX_PINS})",
                self.pins.len()
            )));
        }

        if self.bounce_ms > MAX_WINDOW_MS {
            return Err(AppError::Config(format!(
                "bounce time {} ms out of range (maximum {MAX_WINDOW_MS})",
                self.bounce_ms
            )));
        }
        if self.startup_grace_ms > MAX_WINDOW_MS {
            return Err(AppError::Config(format!(
                "startup grace {} ms out of range (maximum {MAX_WINDOW_MS})",
                self.startup_grace_ms
            )));
        }
        if self.clock_jump_secs == 0 || self.clock_jump_secs > MAX_CLOCK_JUMP_SECS {
            return Err(AppError::Config(format!(
                "clock jump threshold {} s out of range (1 to {MAX_CLOCK_JUMP_SECS})",
                self.clock_jump_secs
            )));
        }
        if self.poll_timeout_ms == 0 || self.poll_timeout_ms > libc::c_int::MAX as u64 {
            return Err(AppError::Config(format!(
                "poll timeout {} ms out of range (1 to {})",
                self.poll_timeout_ms,
                libc::c_int::MAX
            )));
        }

        let mut seen = FxHashSet::default();
        for pin in &self.pins {
            if !seen.insert(*pin) {
                warn!("pin {pin} listed more than once");
            }
        }
        Ok(())
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }
}
