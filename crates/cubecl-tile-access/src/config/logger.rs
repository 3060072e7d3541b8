use alloc::{string::String, vec::Vec};
use core::sync::atomic::{AtomicI8, Ordering};

use super::GlobalConfig;

/// Configuration for logging tile access setup and phase transitions.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LoggerConfig {
    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Optional crate-level logging configuration (e.g., info, debug, trace).
    #[serde(default = "log_default")]
    pub log: Option<LogCrateLevel>,

    /// The log level, determining verbosity.
    #[serde(default)]
    pub level: TileLogLevel,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            stdout: false,
            stderr: false,
            log: log_default(),
            level: TileLogLevel::default(),
        }
    }
}

impl LoggerConfig {
    /// Outputs selected by this config, in emission order.
    fn sinks(&self) -> Vec<LogSink> {
        let mut sinks = Vec::new();
        if self.stdout {
            sinks.push(LogSink::Stdout);
        }
        if self.stderr {
            sinks.push(LogSink::Stderr);
        }
        if let Some(level) = self.log {
            sinks.push(LogSink::Crate(level));
        }
        sinks
    }
}

fn log_default() -> Option<LogCrateLevel> {
    Some(LogCrateLevel::Debug)
}

/// Verbosity of tile access logging.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
pub enum TileLogLevel {
    /// Nothing is logged.
    #[serde(rename = "disabled")]
    Disabled,

    /// Config validation and iterator construction.
    #[default]
    #[serde(rename = "basic")]
    Basic,

    /// Also every predicate recomputation and tile phase transition.
    #[serde(rename = "full")]
    Full,
}

/// Log levels using the `log` crate.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LogSink {
    Stdout,
    Stderr,
    Crate(LogCrateLevel),
}

/// Cached verbosity, `-1` while the global config has not been read.
static LEVEL: AtomicI8 = AtomicI8::new(-1);

/// Outputs built from the global config on the first emitted message.
static SINKS: spin::Once<Vec<LogSink>> = spin::Once::new();

/// Routes tile access messages to the outputs selected in [LoggerConfig].
///
/// The level and the outputs are read from the global config once and cached, so
/// logging never takes the config lock afterwards.
pub struct Logger;

impl Logger {
    /// Current verbosity.
    pub fn level() -> TileLogLevel {
        match LEVEL.load(Ordering::Relaxed) {
            0 => TileLogLevel::Disabled,
            1 => TileLogLevel::Basic,
            2 => TileLogLevel::Full,
            _ => {
                let level = GlobalConfig::get().logger.level;
                LEVEL.store(level as i8, Ordering::Relaxed);
                level
            }
        }
    }

    /// Log a message at [TileLogLevel::Basic].
    pub fn log_basic<F: FnOnce() -> String>(message: F) {
        if Self::level() >= TileLogLevel::Basic {
            Self::emit(&message());
        }
    }

    /// Log a message at [TileLogLevel::Full].
    pub fn log_full<F: FnOnce() -> String>(message: F) {
        if Self::level() >= TileLogLevel::Full {
            Self::emit(&message());
        }
    }

    fn emit(message: &str) {
        let sinks = SINKS.call_once(|| GlobalConfig::get().logger.sinks());

        for sink in sinks {
            match sink {
                #[cfg(feature = "std")]
                LogSink::Stdout => std::println!("{message}"),
                #[cfg(feature = "std")]
                LogSink::Stderr => std::eprintln!("{message}"),
                #[cfg(not(feature = "std"))]
                LogSink::Stdout | LogSink::Stderr => {}
                LogSink::Crate(LogCrateLevel::Info) => log::info!("{message}"),
                LogSink::Crate(LogCrateLevel::Debug) => log::debug!("{message}"),
                LogSink::Crate(LogCrateLevel::Trace) => log::trace!("{message}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered_by_verbosity() {
        assert!(TileLogLevel::Disabled < TileLogLevel::Basic);
        assert!(TileLogLevel::Basic < TileLogLevel::Full);
        assert_eq!(TileLogLevel::Full as i8, 2);
    }

    #[test]
    fn sinks_follow_the_selected_outputs() {
        let config = LoggerConfig {
            stdout: true,
            log: Some(LogCrateLevel::Trace),
            ..Default::default()
        };
        assert_eq!(config.sinks(), [LogSink::Stdout, LogSink::Crate(LogCrateLevel::Trace)]);

        let config = LoggerConfig {
            log: None,
            ..Default::default()
        };
        assert!(config.sinks().is_empty());
    }
}
