use log::{debug, trace, warn};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AppError;
use crate::gpio::{EdgeWatch, GpioBackend, Level};

const SYSFS_DRAIN_BUFFER_SIZE: usize = 50;
// one digit, a newline, and one spare byte to catch anything longer
const SYSFS_VALUE_READ_SIZE: usize = 3;

pub struct SysfsBackend {
    root: PathBuf,
}

impl SysfsBackend {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn pin_file(&self, pin_id: u32, name: &str) -> PathBuf {
        self.root.join(format!("gpio{pin_id}")).join(name)
    }

    fn write_control(path: &Path, text: &str) -> Result<(), AppError> {
        fs::write(path, text)
            .map_err(|e| AppError::Gpio(format!("Can't write to {}: {e}", path.display())))
    }
}

impl GpioBackend for SysfsBackend {
    type Watch = SysfsWatch;

    fn export(&self, pin_id: u32) -> Result<(), AppError> {
        Self::write_control(&self.root.join("export"), &pin_id.to_string())?;
        Self::write_control(&self.pin_file(pin_id, "direction"), "in")?;
        // software filters the edge direction; bouncy contacts make a
        // single-edge hardware trigger unreliable
        Self::write_control(&self.pin_file(pin_id, "edge"), "both")?;
        debug!("exported pin {pin_id}");
        Ok(())
    }

    fn unexport(&self, pin_id: u32) -> Result<(), AppError> {
        Self::write_control(&self.root.join("unexport"), &pin_id.to_string())?;
        debug!("unexported pin {pin_id}");
        Ok(())
    }

    fn watch(&self, pins: &[u32]) -> Result<SysfsWatch, AppError> {
        let files = pins
            .iter()
            .map(|pin_id| {
                let path = self.pin_file(*pin_id, "value");
                OpenOptions::new()
                    .read(true)
                    .custom_flags(libc::O_NONBLOCK)
                    .open(&path)
                    .map_err(|e| {
                        AppError::Gpio(format!("Can't open GPIO device {}: {e}", path.display()))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SysfsWatch {
            root: self.root.clone(),
            files,
        })
    }
}

pub struct SysfsWatch {
    root: PathBuf,
    files: Vec<File>,
}

impl SysfsWatch {
    fn drain(file: &mut File) -> io::Result<()> {
        let mut buffer = [0u8; SYSFS_DRAIN_BUFFER_SIZE];
        file.seek(SeekFrom::Start(0))?;
        let n = file.read(&mut buffer)?;
        trace!("drained {n} notification byte(s)");
        Ok(())
    }
}

impl EdgeWatch for SysfsWatch {
    fn wait(&mut self, timeout: Duration) -> Result<Vec<usize>, AppError> {
        let mut fds: Vec<libc::pollfd> = self
            .files
            .iter()
            .map(|f| libc::pollfd {
                fd: f.as_raw_fd(),
                events: libc::POLLPRI,
                revents: 0,
            })
            .collect();
        let timeout_ms = timeout.as_millis().min(libc::c_int::MAX as u128) as libc::c_int;

        // SAFETY: `fds` is a live, correctly sized array of pollfd for the call.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Vec::new());
            }
            return Err(AppError::Gpio(format!("poll: {err}")));
        }

        let mut ready = Vec::new();
        for (index, fd) in fds.iter().enumerate() {
            if fd.revents & libc::POLLPRI == 0 {
                continue;
            }
            if let Err(e) = Self::drain(&mut self.files[index]) {
                warn!("drain notification for watched pin #{index}: {e}");
            }
            ready.push(index);
        }
        Ok(ready)
    }

    fn read_level(&self, pin_id: u32) -> Level {
        let path = self.root.join(format!("gpio{pin_id}")).join("value");
        read_value_file(&path)
    }
}

pub fn read_value_file(path: &Path) -> Level {
    let mut file = match File::open(path) {
        Ok(f) => f,
        Err(e) => {
            warn!("open {}: {e}", path.display());
            return Level::Unknown;
        }
    };

    let mut buffer = [0u8; SYSFS_VALUE_READ_SIZE];
    match file.read(&mut buffer) {
        Ok(n) => Level::parse(&buffer[..n]),
        Err(e) => {
            warn!("read {}: {e}", path.display());
            Level::Unknown
        }
    }
}
