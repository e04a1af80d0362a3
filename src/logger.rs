//! Development logging for the edcmd binary.
//!
//! The library only emits through the `log` facade; this installs a minimal
//! stderr sink for it. Logging stays off unless `EDCMD_LOG` names a level.

use log::{LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        eprintln!("{}: {}", record.level(), record.args());
    }

    fn flush(&self) {}
}

/// Install the stderr logger with the level named by `EDCMD_LOG`
/// (`trace`, `debug`, `info`, `warn`, `error`). No-op when unset.
pub fn init() {
    let level = match std::env::var("EDCMD_LOG").ok().as_deref() {
        Some("trace") => LevelFilter::Trace,
        Some("debug") => LevelFilter::Debug,
        Some("info") => LevelFilter::Info,
        Some("warn") => LevelFilter::Warn,
        Some("error") => LevelFilter::Error,
        _ => return,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}
