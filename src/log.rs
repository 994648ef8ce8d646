//! Structured logging for debugging epinet.
//!
//! Log levels:
//! - ERROR: Worker panics, failures that abort a task
//! - WARN: Rejected requests (invalid parameters, busy coordinator)
//! - INFO: Task lifecycle (started, finished, cancelled), startup and shutdown
//! - DEBUG: Command dispatch and message handling
//! - TRACE: Progress relay and key handling
//!
//! Lines are written as `[HH:MM:SS.mmm] [LEVEL] message`. The TUI logs to
//! `~/.epinet/epinet.log` because stdout belongs to the terminal backend;
//! headless runs may log to stderr instead.
//!
//! Debug mode can be enabled with `--debug` flag or `EPINET_DEBUG=1` env var.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::OnceLock;

static SINK: OnceLock<LogSink> = OnceLock::new();
static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);
static LOG_LEVEL: AtomicU8 = AtomicU8::new(LogLevel::Info as u8);

/// Log levels for filtering messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum LogLevel {
    Error = 0,
    Warn = 1,
    Info = 2,
    Debug = 3,
    Trace = 4,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "ERROR",
            LogLevel::Warn => "WARN",
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Trace => "TRACE",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogLevel::Error,
            1 => LogLevel::Warn,
            2 => LogLevel::Info,
            3 => LogLevel::Debug,
            _ => LogLevel::Trace,
        }
    }
}

/// Where log lines go. Fixed at initialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogSink {
    File(PathBuf),
    Stderr,
}

/// Initialize file logging under the application directory.
pub fn init_with_debug(debug: bool) {
    let sink = crate::config::Config::app_dir().ok().map(|dir| {
        let _ = std::fs::create_dir_all(&dir);
        let path = dir.join("epinet.log");
        // Truncate file on startup
        let _ = std::fs::write(&path, "");
        LogSink::File(path)
    });
    init_sink(sink, debug);
}

/// Initialize logging to stderr (headless subcommands).
pub fn init_stderr(debug: bool) {
    init_sink(Some(LogSink::Stderr), debug);
}

fn init_sink(sink: Option<LogSink>, debug: bool) {
    let env_debug = std::env::var("EPINET_DEBUG")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let debug_enabled = debug || env_debug;
    DEBUG_ENABLED.store(debug_enabled, Ordering::SeqCst);
    set_level(if debug_enabled {
        LogLevel::Debug
    } else {
        LogLevel::Info
    });

    if let Some(sink) = sink {
        SINK.set(sink).ok();
    }
}

/// Check if debug mode is enabled.
pub fn is_debug() -> bool {
    DEBUG_ENABLED.load(Ordering::Relaxed)
}

/// Set the minimum log level for output.
pub fn set_level(level: LogLevel) {
    LOG_LEVEL.store(level as u8, Ordering::SeqCst);
}

/// Get the current log level.
pub fn get_level() -> LogLevel {
    LogLevel::from_u8(LOG_LEVEL.load(Ordering::Relaxed))
}

fn format_line(level: LogLevel, msg: &str) -> String {
    let timestamp = chrono::Local::now().format("%H:%M:%S%.3f");
    format!("[{}] [{}] {}", timestamp, level.as_str(), msg)
}

/// Log a message at the specified level.
pub fn log_at(level: LogLevel, msg: &str) {
    if level > get_level() {
        return;
    }

    match SINK.get() {
        Some(LogSink::File(path)) => {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(path) {
                let _ = writeln!(file, "{}", format_line(level, msg));
            }
        }
        Some(LogSink::Stderr) => {
            let _ = writeln!(std::io::stderr(), "{}", format_line(level, msg));
        }
        None => {}
    }
}

pub fn error(msg: &str) {
    log_at(LogLevel::Error, msg);
}

pub fn warn(msg: &str) {
    log_at(LogLevel::Warn, msg);
}

pub fn info(msg: &str) {
    log_at(LogLevel::Info, msg);
}

pub fn debug(msg: &str) {
    log_at(LogLevel::Debug, msg);
}

pub fn trace(msg: &str) {
    log_at(LogLevel::Trace, msg);
}

/// Log macro for INFO level.
#[macro_export]
macro_rules! elog {
    ($($arg:tt)*) => {
        $crate::log::info(&format!($($arg)*))
    };
}

/// Log macro for ERROR level.
#[macro_export]
macro_rules! elog_error {
    ($($arg:tt)*) => {
        $crate::log::error(&format!($($arg)*))
    };
}

/// Log macro for WARN level.
#[macro_export]
macro_rules! elog_warn {
    ($($arg:tt)*) => {
        $crate::log::warn(&format!($($arg)*))
    };
}

/// Log macro for DEBUG level (only logs when debug mode is enabled).
#[macro_export]
macro_rules! elog_debug {
    ($($arg:tt)*) => {
        $crate::log::debug(&format!($($arg)*))
    };
}

/// Log macro for TRACE level.
#[macro_export]
macro_rules! elog_trace {
    ($($arg:tt)*) => {
        $crate::log::trace(&format!($($arg)*))
    };
}
