use log::{debug, info};
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::error::AppError;
use crate::gpio::EdgeEvent;
use crate::shutdown::ShutdownSignal;

const PIPE_OPEN_RETRY_INTERVAL: Duration = Duration::from_millis(100);

pub fn open_pipe(path: &Path, shutdown: &ShutdownSignal) -> Result<Option<File>, AppError> {
    make_fifo(path)?;

    let mut waiting_logged = false;
    loop {
        if shutdown.is_requested() {
            return Ok(None);
        }
        match OpenOptions::new()
            .write(true)
            .custom_flags(libc::O_NONBLOCK)
            .open(path)
        {
            Ok(file) => {
                set_blocking(&file).map_err(|e| {
                    AppError::Channel(format!("Can't configure pipe {}: {e}", path.display()))
                })?;
                info!("consumer connected to {}", path.display());
                return Ok(Some(file));
            }
            // no reader on the other end yet
            Err(e) if e.raw_os_error() == Some(libc::ENXIO) => {
                if !waiting_logged {
                    info!("waiting for a reader on {}", path.display());
                    waiting_logged = true;
                }
                thread::sleep(PIPE_OPEN_RETRY_INTERVAL);
            }
            Err(e) => {
                return Err(AppError::Channel(format!(
                    "Can't open pipe {} for writing: {e}",
                    path.display()
                )));
            }
        }
    }
}

fn make_fifo(path: &Path) -> Result<(), AppError> {
    let c_path = CString::new(path.as_os_str().as_bytes())
        .map_err(|_| AppError::Channel(format!("invalid pipe path {}", path.display())))?;

    // SAFETY: `c_path` is a valid NUL-terminated string for the call.
    let rc = unsafe { libc::mkfifo(c_path.as_ptr(), 0o777) };
    if rc != 0 {
        let err = io::Error::last_os_error();
        if err.kind() != io::ErrorKind::AlreadyExists {
            return Err(AppError::Channel(format!(
                "Can't create pipe {}: {err}",
                path.display()
            )));
        }
        debug!("pipe {} already exists", path.display());
    }
    Ok(())
}

fn set_blocking(file: &File) -> io::Result<()> {
    let fd = file.as_raw_fd();
    // SAFETY: `fd` stays open for the duration of both calls.
    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(io::Error::last_os_error());
    }
    if unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) } < 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub struct Emitter<W: Write> {
    out: W,
}

impl<W: Write> Emitter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn emit(&mut self, event: &EdgeEvent) -> Result<(), AppError> {
        writeln!(self.out, "{event}")
            .and_then(|_| self.out.flush())
            .map_err(|e| match e.kind() {
                io::ErrorKind::BrokenPipe => AppError::ChannelClosed,
                _ => AppError::Channel(format!("write event: {e}")),
            })
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }
}
