use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use crate::error::AppError;

// Flag reached from the SIGQUIT handler, which cannot capture state.
static QUIT_TARGET: OnceLock<Arc<AtomicBool>> = OnceLock::new();

#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    // SIGPIPE stays ignored: a departed consumer surfaces as a BrokenPipe
    // write error on the loop thread instead.
    pub fn install(&self) -> Result<(), AppError> {
        let flag = self.requested.clone();
        ctrlc::set_handler(move || {
            info!("termination requested");
            flag.store(true, Ordering::SeqCst);
        })
        .map_err(|e| AppError::Signal(format!("install termination handler: {e}")))?;

        QUIT_TARGET
            .set(self.requested.clone())
            .map_err(|_| AppError::Signal("quit handler already installed".into()))?;
        let handler = on_quit as extern "C" fn(libc::c_int);
        // SAFETY: the handler only performs an atomic store.
        let previous = unsafe { libc::signal(libc::SIGQUIT, handler as libc::sighandler_t) };
        if previous == libc::SIG_ERR {
            return Err(AppError::Signal(format!(
                "install quit handler: {}",
                std::io::Error::last_os_error()
            )));
        }
        Ok(())
    }
}

extern "C" fn on_quit(_signum: libc::c_int) {
    if let Some(flag) = QUIT_TARGET.get() {
        flag.store(true, Ordering::SeqCst);
    }
}
