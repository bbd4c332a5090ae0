use std::fs::OpenOptions;
use std::io::{self, Read, Write};
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};

use buttonpipe::{AppError, EdgeEvent, EdgeMode, Emitter, ShutdownSignal, open_pipe};

fn event(pin_id: u32, state: u8, mode: EdgeMode) -> EdgeEvent {
    EdgeEvent {
        pin_id,
        state,
        mode,
    }
}

struct FailingWriter(io::ErrorKind);

impl Write for FailingWriter {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::from(self.0))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn record_shape_depends_on_mode() {
    let mut emitter = Emitter::new(Vec::new());

    emitter.emit(&event(17, 1, EdgeMode::Both)).expect("emit");
    emitter.emit(&event(17, 0, EdgeMode::Both)).expect("emit");
    emitter.emit(&event(4, 1, EdgeMode::Rising)).expect("emit");
    emitter.emit(&event(4, 0, EdgeMode::Falling)).expect("emit");

    assert_eq!(emitter.get_ref(), b"17 1\n17 0\n4\n4\n");
}

#[test]
fn broken_pipe_means_consumer_left() {
    let mut emitter = Emitter::new(FailingWriter(io::ErrorKind::BrokenPipe));
    let err = emitter.emit(&event(17, 1, EdgeMode::Both)).expect_err("closed");
    assert!(matches!(err, AppError::ChannelClosed));

    let mut emitter = Emitter::new(FailingWriter(io::ErrorKind::Other));
    let err = emitter.emit(&event(17, 1, EdgeMode::Both)).expect_err("failed");
    assert!(matches!(err, AppError::Channel(_)));
}

#[test]
fn open_pipe_creates_fifo_and_honours_shutdown() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pi-buttons");
    let shutdown = ShutdownSignal::new();
    shutdown.request();

    let file = open_pipe(&path, &shutdown).expect("open pipe");

    assert!(file.is_none());
    let meta = std::fs::metadata(&path).expect("fifo exists");
    assert!(meta.file_type().is_fifo());
}

#[test]
fn events_reach_the_reader_until_it_leaves() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pi-buttons");
    let shutdown = ShutdownSignal::new();

    let stopped = ShutdownSignal::new();
    stopped.request();

    // create the fifo, then attach a reader before the writer opens
    assert!(open_pipe(&path, &stopped).expect("create fifo").is_none());
    let mut reader = OpenOptions::new()
        .read(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(&path)
        .expect("reader");

    let file = open_pipe(&path, &shutdown)
        .expect("open pipe")
        .expect("reader present");
    let mut emitter = Emitter::new(file);
    emitter.emit(&event(27, 1, EdgeMode::Both)).expect("emit");

    let mut buffer = [0u8; 16];
    let n = reader.read(&mut buffer).expect("read");
    assert_eq!(&buffer[..n], b"27 1\n");

    drop(reader);
    let err = emitter.emit(&event(27, 0, EdgeMode::Both)).expect_err("reader gone");
    assert!(matches!(err, AppError::ChannelClosed));
}

#[test]
fn existing_fifo_is_reused() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("pi-buttons");
    let shutdown = ShutdownSignal::new();
    shutdown.request();

    assert!(open_pipe(&path, &shutdown).expect("first").is_none());
    assert!(open_pipe(&path, &shutdown).expect("second").is_none());
}
