//! Stderr logger for the `log` facade.
//!
//! Lines are `seq|level|target|message` so output from several runs can be
//! merged and sorted by sequence number.

use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};

static LOG_SEQ: AtomicU64 = AtomicU64::new(0);

static LOGGER: StderrLogger = StderrLogger;

struct StderrLogger;

fn level_tag(level: Level) -> &'static str {
    match level {
        Level::Error => "E",
        Level::Warn => "W",
        Level::Info => "I",
        Level::Debug => "D",
        Level::Trace => "T",
    }
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let seq = LOG_SEQ.fetch_add(1, Ordering::SeqCst) + 1;
        let mut stderr = std::io::stderr().lock();
        // A closed stderr is not worth aborting a calculation for
        let _ = writeln!(
            stderr,
            "{}|{}|{}|{}",
            seq,
            level_tag(record.level()),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Level for a `-v` count. Advisories are already printed with the
/// results, so the default level is errors only.
pub fn level_for_verbosity(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Error,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the logger. Fails if another logger is already set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}
