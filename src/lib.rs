mod app;
mod backend;
mod channel;
mod cli;
mod clock;
mod config;
mod debounce;
mod error;
mod event_loop;
mod exporter;
mod gpio;
mod shutdown;

pub use app::{monitor, run_one_shot};
pub use channel::{Emitter, open_pipe};
pub use cli::Cli;
pub use clock::{Clock, ClockGuard, ManualClock, SystemClock};
pub use config::{
    AppConfig, DEFAULT_BOUNCE_MS, DEFAULT_CLOCK_JUMP_SECS, DEFAULT_PIPE_PATH,
    DEFAULT_POLL_TIMEOUT_MS, DEFAULT_SETTLE_MS, DEFAULT_STARTUP_GRACE_MS, DEFAULT_SYSFS_ROOT,
    EdgeMode, MAX_CLOCK_JUMP_SECS, MAX_PINS, MAX_WINDOW_MS, Output, RunMode,
};
pub use debounce::{Debouncer, PinEntry};
pub use error::AppError;
pub use event_loop::{EventLoop, StopReason};
pub use exporter::{export_pins, unexport_pins};
pub use gpio::{EdgeEvent, EdgeWatch, GpioBackend, Level, LineIndex};
pub use shutdown::ShutdownSignal;

#[cfg(feature = "chardev")]
pub use backend::{LibgpiodBackend, LibgpiodWatch};
pub use backend::{MockGpioBackend, MockWake, MockWatch, SysfsBackend, SysfsWatch, read_value_file};
