//! Formats top-level failures for the error dialog and the log.

use std::backtrace::{Backtrace, BacktraceStatus};
use std::error::Error;
use std::fmt::Write;
use std::panic::PanicHookInfo;

use chrono::{DateTime, Local};

use crate::format::clock_stamp;

/// Builds a report for an error that reached the top of the program.
///
/// The report has a header line, the error message, and one
/// `[Caused by]` entry per `source()` in the chain.
pub fn report(err: &(dyn Error + 'static), context: &str, at: &DateTime<Local>) -> String {
    let mut out = header(context, at);
    let _ = writeln!(out, "[Error]: {err}");
    let _ = writeln!(out, "[Type]: {err:?}");

    let mut source = err.source();
    while let Some(cause) = source {
        let _ = writeln!(out, "[Caused by]: {cause}");
        source = cause.source();
    }
    out
}

/// Builds a report for a panic, including its location and backtrace.
pub fn panic_report(info: &PanicHookInfo<'_>, backtrace: &Backtrace, at: &DateTime<Local>) -> String {
    let payload = info.payload();
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".into());
    let thread = std::thread::current();

    let mut out = header("panic", at);
    let _ = writeln!(out, "[Error]: {message}");
    let _ = writeln!(out, "[Thread]: {}", thread.name().unwrap_or("unnamed"));
    if let Some(loc) = info.location() {
        let _ = writeln!(out, "[Location]: {}:{}:{}", loc.file(), loc.line(), loc.column());
    }
    if backtrace.status() == BacktraceStatus::Captured {
        let _ = writeln!(out, "[StackTrace]:\n{backtrace}");
    }
    out
}

fn header(context: &str, at: &DateTime<Local>) -> String {
    let label = if context.is_empty() {
        clock_stamp(at)
    } else {
        format!("{context} @ {}", clock_stamp(at))
    };
    format!("---[{label}]---\n")
}
