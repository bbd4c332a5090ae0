use log::{info, warn};
use std::io::Write;
use std::sync::Arc;

use crate::clock::{Clock, ClockGuard};
use crate::config::{AppConfig, RunMode};
use crate::error::AppError;
use crate::event_loop::{EventLoop, StopReason};
use crate::exporter;
use crate::gpio::GpioBackend;
use crate::shutdown::ShutdownSignal;

pub fn run_one_shot<B: GpioBackend>(
    backend: &B,
    config: &AppConfig,
    mode: RunMode,
) -> Result<bool, AppError> {
    match mode {
        RunMode::UnexportOnly => exporter::unexport_pins(backend, &config.pins).map(|_| true),
        RunMode::ExportOnly => exporter::export_pins(backend, &config.pins).map(|_| true),
        RunMode::Monitor => Ok(false),
    }
}

pub fn monitor<B, C, O, F>(
    backend: &B,
    config: &AppConfig,
    clock: Arc<C>,
    guard: ClockGuard,
    shutdown: &ShutdownSignal,
    open_output: F,
) -> Result<StopReason, AppError>
where
    B: GpioBackend,
    C: Clock,
    O: Write,
    F: FnOnce(&ShutdownSignal) -> Result<Option<O>, AppError>,
{
    exporter::acquire(backend, config)?;
    let watch = backend.watch(&config.pins)?;

    let Some(out) = open_output(shutdown)? else {
        drop(watch);
        exporter::release(backend, config)?;
        return Ok(StopReason::Signal);
    };

    let mut event_loop = EventLoop::new(config, watch, clock, guard, out);
    let stopped = event_loop.run(shutdown);
    // value sources must be closed before the pins go away
    drop(event_loop);

    let released = exporter::release(backend, config);
    let reason = match stopped {
        Ok(reason) => reason,
        Err(e) => {
            if let Err(release_err) = released {
                warn!("cleanup after failure: {release_err}");
            }
            return Err(e);
        }
    };
    released?;

    info!("stopped: {reason:?}");
    Ok(reason)
}
