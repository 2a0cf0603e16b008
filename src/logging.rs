// src/logging.rs

//! Logger setup.
//!
//! Console logging via env_logger, optionally duplicated into an
//! append-mode log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use env_logger::{Env, Target};

use crate::error::Result;

/// Writer that copies every log line to a console stream and a file.
struct TeeWriter<W: Write> {
    console: W,
    file: File,
}

impl<W: Write> Write for TeeWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.console.flush()?;
        self.file.flush()
    }
}

/// Initialize the global logger.
///
/// `level` is the default filter when `RUST_LOG` is unset. When `file`
/// is given, output also lands in that file; parent directories are
/// created and the file is opened in append mode.
pub fn init(level: &str, file: Option<&Path>) -> Result<()> {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or(level));
    builder.format_timestamp_secs();

    if let Some(path) = file {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(TeeWriter {
            console: io::stderr(),
            file,
        })));
    }

    // Repeated calls in one process (tests) are not an error.
    let _ = builder.try_init();
    Ok(())
}
