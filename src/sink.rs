// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! Text sink for diagnostic dumps.
//!
//! The core only ever asks a sink to write text and, once, to close. Where the
//! text lands is the sink's business: a file (truncated on open), stderr when
//! the file cannot be opened, or an in-memory buffer for tests.
//!
//! The process-wide sink is opened lazily on the first write, at the path set
//! by `configure`, and closed by `close` (called from `global::shutdown`).
//! A `static` is never dropped, so the shared sink flushes after every write:
//! a process that exits without `shutdown` still has every dump on disk. A
//! write after `close` reopens the same file for appending.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};
use parking_lot::Mutex;

use crate::config::DEFAULT_LOG_PATH;

#[derive(Debug)]
enum Target {
    File(BufWriter<File>),
    Stderr,
    Memory(Vec<u8>),
    Closed,
}

#[derive(Debug)]
pub struct LogSink {
    target: Target,
    path: Option<PathBuf>,
}

impl LogSink {
    /// Open (and truncate) `path`, falling back to stderr if that fails.
    pub fn open(path: &Path) -> Self {
        Self::open_with(path, OpenOptions::new().write(true).create(true).truncate(true))
    }

    /// Open `path` for appending, keeping what is already there.
    pub fn append(path: &Path) -> Self {
        Self::open_with(path, OpenOptions::new().append(true).create(true))
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Self {
        match options.open(path) {
            Ok(file) => {
                debug!("log sink opened at {}", path.display());
                Self {
                    target: Target::File(BufWriter::new(file)),
                    path: Some(path.to_path_buf()),
                }
            }
            Err(err) => {
                warn!(
                    "cannot open log file {}: {}; writing to stderr",
                    path.display(),
                    err
                );
                Self::stderr()
            }
        }
    }

    pub fn stderr() -> Self {
        Self {
            target: Target::Stderr,
            path: None,
        }
    }

    /// Sink that keeps everything in memory; read it back with `captured`.
    pub fn memory() -> Self {
        Self {
            target: Target::Memory(Vec::new()),
            path: None,
        }
    }

    pub fn write_text(&mut self, text: &str) -> io::Result<()> {
        match &mut self.target {
            Target::File(w) => w.write_all(text.as_bytes()),
            Target::Stderr => io::stderr().lock().write_all(text.as_bytes()),
            Target::Memory(buf) => {
                buf.extend_from_slice(text.as_bytes());
                Ok(())
            }
            Target::Closed => Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "log sink already closed",
            )),
        }
    }

    /// Flush and release the destination. Closing twice is a no-op.
    pub fn close(&mut self) -> io::Result<()> {
        let result = self.flush();
        if !matches!(self.target, Target::Memory(_)) {
            self.target = Target::Closed;
        }
        result
    }

    pub fn flush(&mut self) -> io::Result<()> {
        match &mut self.target {
            Target::File(w) => w.flush(),
            Target::Stderr => io::stderr().flush(),
            Target::Memory(_) | Target::Closed => Ok(()),
        }
    }

    /// File path, if this sink writes to a file.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.target, Target::Closed)
    }

    pub fn captured(&self) -> Option<&str> {
        match &self.target {
            Target::Memory(buf) => std::str::from_utf8(buf).ok(),
            _ => None,
        }
    }
}

impl Drop for LogSink {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

// ============================================================================
// PROCESS-WIDE SINK
// ============================================================================

struct Shared {
    path: Option<PathBuf>,
    sink: Option<LogSink>,
    /// The current path has been opened (and truncated) once already.
    started: bool,
}

static SHARED: Mutex<Shared> = parking_lot::const_mutex(Shared {
    path: None,
    sink: None,
    started: false,
});

/// Set the path the process-wide sink opens on first write.
///
/// Has no effect on a sink that is already open. A new path is truncated on
/// its first open.
pub fn configure(path: &Path) {
    let mut shared = SHARED.lock();
    if shared.path.as_deref() != Some(path) {
        shared.started = false;
    }
    shared.path = Some(path.to_path_buf());
}

/// Replace the process-wide sink, returning the previous one.
pub fn install(sink: LogSink) -> Option<LogSink> {
    SHARED.lock().sink.replace(sink)
}

/// Remove the process-wide sink without closing it.
pub fn take() -> Option<LogSink> {
    SHARED.lock().sink.take()
}

/// Write to the process-wide sink and flush, opening it first if needed.
pub fn write(text: &str) -> io::Result<()> {
    let mut shared = SHARED.lock();
    let path = shared
        .path
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_PATH));
    let reopen = shared.started;
    shared.started = true;
    let sink = shared.sink.get_or_insert_with(|| {
        if reopen {
            LogSink::append(&path)
        } else {
            LogSink::open(&path)
        }
    });
    sink.write_text(text)?;
    sink.flush()
}

/// Flush and drop the process-wide sink. A later `write` reopens it.
pub fn close() -> io::Result<()> {
    let sink = SHARED.lock().sink.take();
    match sink {
        Some(mut sink) => sink.close(),
        None => Ok(()),
    }
}
