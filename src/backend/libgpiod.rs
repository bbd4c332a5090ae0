use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

use libgpiod::{chip::Chip, line, request};
use crate::error::AppError;
use crate::gpio::{EdgeWatch, GpioBackend, Level, LineIndex};

const LIBGPIOD_BACKEND_EVENT_BUFFER_CAPACITY: usize = 64;

pub struct LibgpiodBackend {
    chip: PathBuf,
}

impl LibgpiodBackend {
    pub fn new<P: Into<PathBuf>>(chip: P) -> Self {
        Self { chip: chip.into() }
    }

    fn open_chip(path: &Path) -> Result<Chip, AppError> {
        Chip::open(&path).map_err(|e| AppError::Gpio(format!("open chip {}: {e}", path.display())))
    }

    fn make_line_config(offsets: &[u32]) -> Result<line::Config, AppError> {
        let mut ls =
            line::Settings::new().map_err(|e| AppError::Gpio(format!("libgpiod settings: {e}")))?;
        ls.set_direction(line::Direction::Input)
            .map_err(|e| AppError::Gpio(format!("set direction: {e}")))?;
        ls.set_edge_detection(Some(line::Edge::Both))
            .map_err(|e| AppError::Gpio(format!("set edge detection: {e}")))?;

        let mut cfg =
            line::Config::new().map_err(|e| AppError::Gpio(format!("line config: {e}")))?;
        cfg.add_line_settings(offsets, ls)
            .map_err(|e| AppError::Gpio(format!("line config add settings: {e}")))?;
        Ok(cfg)
    }

    fn request_lines(chip: &Chip, line_cfg: &line::Config) -> Result<request::Request, AppError> {
        let mut req_cfg =
            request::Config::new().map_err(|e| AppError::Gpio(format!("request config: {e}")))?;
        req_cfg
            .set_consumer(env!("CARGO_PKG_NAME"))
            .map_err(|e| AppError::Gpio(format!("request consumer: {e}")))?;
        chip.request_lines(Some(&req_cfg), line_cfg)
            .map_err(|e| AppError::Gpio(format!("request lines: {e}")))
    }
}

impl GpioBackend for LibgpiodBackend {
    type Watch = LibgpiodWatch;

    fn export(&self, pin_id: u32) -> Result<(), AppError> {
        debug!("pin {pin_id} is claimed by the line request, nothing to export");
        Ok(())
    }

    fn unexport(&self, pin_id: u32) -> Result<(), AppError> {
        debug!("pin {pin_id} is released with the line request, nothing to unexport");
        Ok(())
    }

    fn watch(&self, pins: &[u32]) -> Result<LibgpiodWatch, AppError> {
        let chip = Self::open_chip(&self.chip)?;
        let line_cfg = Self::make_line_config(pins)?;
        let request = Self::request_lines(&chip, &line_cfg)?;
        let buffer = request::Buffer::new(LIBGPIOD_BACKEND_EVENT_BUFFER_CAPACITY)
            .map_err(|e| AppError::Gpio(format!("event buffer: {e}")))?;

        Ok(LibgpiodWatch {
            request,
            buffer,
            index: LineIndex::new(pins),
        })
    }
}

pub struct LibgpiodWatch {
    request: request::Request,
    buffer: request::Buffer,
    index: LineIndex,
}

impl EdgeWatch for LibgpiodWatch {
    fn wait(&mut self, timeout: Duration) -> Result<Vec<usize>, AppError> {
        let has_event = self
            .request
            .wait_edge_events(Some(timeout))
            .map_err(|e| AppError::Gpio(format!("wait edge events: {e}")))?;
        if !has_event {
            return Ok(Vec::new());
        }

        // reading the events is what drains the notification
        let events = self
            .request
            .read_edge_events(&mut self.buffer)
            .map_err(|e| AppError::Gpio(format!("read edge events: {e}")))?;

        Ok(self
            .index
            .ready(events.filter_map(Result::ok).map(|evt| evt.line_offset())))
    }

    fn read_level(&self, pin_id: u32) -> Level {
        match self.request.value(pin_id) {
            Ok(line::Value::InActive) => Level::Low,
            Ok(line::Value::Active) => Level::High,
            Err(e) => {
                warn!("get value of line {pin_id}: {e}");
                Level::Unknown
            }
        }
    }
}
