use log::{debug, info, warn};
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::Emitter;
use crate::clock::{Clock, ClockGuard};
use crate::config::{AppConfig, EdgeMode};
use crate::debounce::{Debouncer, PinEntry};
use crate::error::AppError;
use crate::gpio::{EdgeEvent, EdgeWatch};
use crate::shutdown::ShutdownSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Signal,
    ChannelClosed,
}

pub struct EventLoop<W: EdgeWatch, C: Clock, O: Write> {
    entries: Vec<PinEntry>,
    watch: W,
    clock: Arc<C>,
    guard: ClockGuard,
    debouncer: Debouncer,
    edge: EdgeMode,
    settle: Duration,
    poll_timeout: Duration,
    emitter: Emitter<O>,
}

impl<W: EdgeWatch, C: Clock, O: Write> EventLoop<W, C, O> {
    pub fn new(config: &AppConfig, watch: W, clock: Arc<C>, guard: ClockGuard, out: O) -> Self {
        Self {
            entries: config.pins.iter().copied().map(PinEntry::new).collect(),
            watch,
            clock,
            guard,
            debouncer: Debouncer::new(config.bounce_ms, config.startup_grace_ms),
            edge: config.edge,
            settle: config.settle_delay(),
            poll_timeout: config.poll_timeout(),
            emitter: Emitter::new(out),
        }
    }

    pub fn entries(&self) -> &[PinEntry] {
        &self.entries
    }

    pub fn guard(&self) -> &ClockGuard {
        &self.guard
    }

    pub fn output(&self) -> &O {
        self.emitter.get_ref()
    }

    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<StopReason, AppError> {
        info!("watching {} pin(s), edge mode {:?}", self.entries.len(), self.edge);
        loop {
            if shutdown.is_requested() {
                return Ok(StopReason::Signal);
            }
            let ready = self.watch.wait(self.poll_timeout)?;
            if shutdown.is_requested() {
                return Ok(StopReason::Signal);
            }
            match self.dispatch(&ready) {
                Ok(()) => {}
                Err(AppError::ChannelClosed) => return Ok(StopReason::ChannelClosed),
                Err(e) => return Err(e),
            }
        }
    }

    pub fn dispatch(&mut self, ready: &[usize]) -> Result<(), AppError> {
        for &index in ready {
            if index < self.entries.len() {
                self.handle_pin(index)?;
            }
        }
        Ok(())
    }

    fn handle_pin(&mut self, index: usize) -> Result<(), AppError> {
        // elapsed time restarts at zero after a resync, so the grace applies again
        let Some(now_ms) = self.guard.elapsed(self.clock.wall_ms()) else {
            return Ok(());
        };

        let pin_id = self.entries[index].pin_id;
        if !self.debouncer.admits(&self.entries[index], now_ms) {
            debug!("pin {pin_id}: transition at {now_ms} ms suppressed");
            return Ok(());
        }

        // the value file can lag the interrupt slightly
        self.clock.sleep(self.settle);
        let level = self.watch.read_level(pin_id);
        let Some(state) = level.as_digit() else {
            warn!("pin {pin_id}: indeterminate level, event dropped");
            return Ok(());
        };

        if self.edge.admits(level) {
            self.emitter.emit(&EdgeEvent {
                pin_id,
                state,
                mode: self.edge,
            })?;
        } else {
            debug!("pin {pin_id}: level {state} filtered by edge mode");
        }
        self.debouncer.accept(&mut self.entries[index], now_ms);
        Ok(())
    }
}
