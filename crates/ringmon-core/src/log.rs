//! Leveled logging to a dated file.
//!
//! Logs go to `<data-local>/ringmon/logs/<yyyy-mm-dd>_ringmon.log`, or to
//! the working directory when that location cannot be created. The file
//! name follows the current date, so each day starts a new file.
//!
//! There is no global logger. A sink is created once at startup and
//! handed to every component through [`crate::Context`]; tests pass a
//! [`MemoryLog`] instead.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::format::{date_stamp, log_stamp};

const APP_TITLE: &str = "ringmon";

/// Logging configuration, the `[logging]` table in `settings.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Whether file logging is enabled. Defaults to `true` so attribution
    /// findings are kept.
    pub enabled: bool,
    /// Minimum level: "debug", "verbose", "info", "warning", "error",
    /// "success" or "important".
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".into(),
        }
    }
}

/// Log severity levels, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    Debug,
    Verbose,
    Info,
    Warning,
    Error,
    Success,
    Important,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Verbose => "VERBOSE",
            Self::Info => "INFO",
            Self::Success => "SUCCESS",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Important => "IMPORTANT",
        }
    }

    /// Parses a level name. Unknown names fall back to `Info`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "debug" => Self::Debug,
            "verbose" | "trace" => Self::Verbose,
            "success" => Self::Success,
            "warn" | "warning" => Self::Warning,
            "error" => Self::Error,
            "important" => Self::Important,
            _ => Self::Info,
        }
    }
}

/// One log event together with the call site that produced it.
pub struct LogRecord<'a> {
    pub level: Level,
    pub args: fmt::Arguments<'a>,
    pub file: &'static str,
    pub module: &'static str,
    pub line: u32,
}

impl LogRecord<'_> {
    /// Renders the record as a single log line stamped with `at`.
    ///
    /// `[10/18/2026 09:15:02.123 PM -> scan.rs -> ringmon_core::scan(line 88)] [INFO] message`
    pub fn render<Tz: TimeZone>(&self, at: &DateTime<Tz>) -> String
    where
        Tz::Offset: fmt::Display,
    {
        let file = Path::new(self.file)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(self.file);
        format!(
            "[{stamp} -> {file} -> {module}(line {line})] [{lvl}] {args}",
            stamp = log_stamp(at),
            module = self.module,
            line = self.line,
            lvl = self.level.as_str(),
            args = self.args,
        )
    }
}

/// Destination for log records.
pub trait LogSink: Send + Sync {
    fn write(&self, record: &LogRecord<'_>);
}

impl<T: LogSink + ?Sized> LogSink for Arc<T> {
    fn write(&self, record: &LogRecord<'_>) {
        (**self).write(record);
    }
}

impl<T: LogSink + ?Sized> LogSink for &T {
    fn write(&self, record: &LogRecord<'_>) {
        (**self).write(record);
    }
}

/// Entry point for the `log_*!` macros.
pub fn emit<S: LogSink + ?Sized>(
    sink: &S,
    level: Level,
    args: fmt::Arguments<'_>,
    file: &'static str,
    module: &'static str,
    line: u32,
) {
    sink.write(&LogRecord {
        level,
        args,
        file,
        module,
        line,
    });
}

/// Appends log lines to a dated file.
pub struct FileLog {
    dir: PathBuf,
    min_level: Level,
    enabled: bool,
    // Serializes our own threads; other processes are handled by the
    // exclusive open in `append`.
    write_lock: Mutex<()>,
}

impl FileLog {
    /// Creates a file sink under the best writable root available.
    pub fn new(config: &LogConfig) -> Self {
        Self::with_dir(discover_log_dir(), config)
    }

    /// Creates a file sink that writes into `dir`.
    pub fn with_dir(dir: PathBuf, config: &LogConfig) -> Self {
        Self {
            dir,
            min_level: Level::parse(&config.level),
            enabled: config.enabled,
            write_lock: Mutex::new(()),
        }
    }

    /// Directory the log files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the log file for the given day.
    pub fn path_for<Tz: TimeZone>(&self, day: &DateTime<Tz>) -> PathBuf
    where
        Tz::Offset: fmt::Display,
    {
        self.dir
            .join(format!("{}_{APP_TITLE}.log", date_stamp(day)))
    }
}

impl LogSink for FileLog {
    fn write(&self, record: &LogRecord<'_>) {
        if !self.enabled || record.level < self.min_level {
            return;
        }
        let now = Local::now();
        let line = record.render(&now);
        let path = self.path_for(&now);

        let Ok(_guard) = self.write_lock.lock() else {
            return;
        };
        // A locked file means another writer owns it right now. The line
        // is dropped rather than queued.
        let _ = append(&path, &line);
    }
}

/// Opens `path` for exclusive append and writes one line.
fn append(path: &Path, line: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);

    #[cfg(windows)]
    {
        use std::os::windows::fs::OpenOptionsExt;
        options.share_mode(0);
    }

    let mut file = options.open(path)?;
    writeln!(file, "{line}")
}

/// Picks the log directory: `<data-local>/ringmon/logs` when it can be
/// created, otherwise the working directory.
fn discover_log_dir() -> PathBuf {
    if let Some(base) = dirs::data_local_dir() {
        let dir = base.join(APP_TITLE).join("logs");
        if fs::create_dir_all(&dir).is_ok() {
            return dir;
        }
    }
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

/// In-memory sink that keeps every message, for tests.
#[derive(Default)]
pub struct MemoryLog {
    lines: Mutex<Vec<(Level, String)>>,
}

impl MemoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, without the call-site prefix.
    pub fn messages(&self) -> Vec<(Level, String)> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Returns true if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages().iter().any(|(_, m)| m.contains(needle))
    }

    /// Number of messages recorded at `level`.
    pub fn count(&self, level: Level) -> usize {
        self.messages().iter().filter(|(l, _)| *l == level).count()
    }
}

impl LogSink for MemoryLog {
    fn write(&self, record: &LogRecord<'_>) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push((record.level, record.args.to_string()));
        }
    }
}

/// Logs at DEBUG level.
#[macro_export]
macro_rules! log_debug {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit(&$sink, $crate::log::Level::Debug, format_args!($($arg)*), file!(), module_path!(), line!())
    };
}

/// Logs at VERBOSE level.
#[macro_export]
macro_rules! log_verbose {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit(&$sink, $crate::log::Level::Verbose, format_args!($($arg)*), file!(), module_path!(), line!())
    };
}

/// Logs at INFO level.
#[macro_export]
macro_rules! log_info {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit(&$sink, $crate::log::Level::Info, format_args!($($arg)*), file!(), module_path!(), line!())
    };
}

/// Logs at SUCCESS level.
#[macro_export]
macro_rules! log_success {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit(&$sink, $crate::log::Level::Success, format_args!($($arg)*), file!(), module_path!(), line!())
    };
}

/// Logs at WARNING level.
#[macro_export]
macro_rules! log_warn {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit(&$sink, $crate::log::Level::Warning, format_args!($($arg)*), file!(), module_path!(), line!())
    };
}

/// Logs at ERROR level.
#[macro_export]
macro_rules! log_error {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit(&$sink, $crate::log::Level::Error, format_args!($($arg)*), file!(), module_path!(), line!())
    };
}

/// Logs at IMPORTANT level.
#[macro_export]
macro_rules! log_important {
    ($sink:expr, $($arg:tt)*) => {
        $crate::log::emit(&$sink, $crate::log::Level::Important, format_args!($($arg)*), file!(), module_path!(), line!())
    };
}
