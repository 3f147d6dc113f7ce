//! Logging to standard error.
//!
//! Standard output is reserved for documents written with `--stdout`.
use std::io::{self, Write};
use std::time::Instant;

use chrono::prelude::*;
use colored::*;
use log::{Level, Log, Metadata, Record, SetLoggerError};

/// A logger that writes timestamped, colored records to `stderr`.
pub struct Logger {
    level: Level,
    timestamps: bool,
}

impl Logger {
    pub fn new(level: Level) -> Self {
        Self {
            level,
            timestamps: level >= Level::Debug,
        }
    }

    fn format(&self, record: &Record) -> String {
        let message = format!("{:<5} {}", record.level(), record.args());

        if self.timestamps {
            format!(
                "{} {message}",
                Local::now().to_rfc3339_opts(SecondsFormat::Millis, true)
            )
        } else {
            message
        }
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let message = self.format(record);
        let message = match record.level() {
            Level::Error => message.red(),
            Level::Warn => message.yellow(),
            Level::Info => message.normal(),
            Level::Debug => message.dimmed(),
            Level::Trace => message.white().dimmed(),
        };
        // Nowhere to report a failure to write to stderr.
        writeln!(&mut io::stderr(), "{message}").ok();
    }

    fn flush(&self) {}
}

/// Initialize the global logger.
pub fn init(level: Level) -> Result<(), SetLoggerError> {
    log::set_boxed_logger(Box::new(Logger::new(level)))?;
    log::set_max_level(level.to_level_filter());

    Ok(())
}

/// Get the level set by the environment variable `RUST_LOG`, if
/// present.
pub fn env_level() -> Option<Level> {
    let level = std::env::var("RUST_LOG").ok()?;
    level.parse().ok()
}

/// Run a fallible callback, logging how long it took.
pub fn benchmark<T, E, F>(msg: &str, callback: F) -> Result<T, E>
where
    F: FnOnce() -> Result<T, E>,
{
    let now = Instant::now();
    let res = callback();
    let elapsed = now.elapsed().as_millis();
    log::debug!(target: "gitviz", "{msg} took {elapsed}ms");

    res
}
