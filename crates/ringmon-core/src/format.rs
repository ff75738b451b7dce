//! Human-readable formatting for log lines and attribution records.
//!
//! Timestamps are rendered in local time.

use std::fmt::Display;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local, TimeZone};

/// Converts a `SystemTime` into local time.
pub fn local(t: SystemTime) -> DateTime<Local> {
    DateTime::from(t)
}

/// `yyyy-MM-dd`, used in log file names.
pub fn date_stamp<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format("%Y-%m-%d").to_string()
}

/// `MM/dd/yyyy hh:mm:ss.fff AM`, used as the log line prefix.
pub fn log_stamp<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format("%m/%d/%Y %I:%M:%S%.3f %p").to_string()
}

/// `hh:mm:ss.fff AM`.
pub fn clock_stamp<Tz: TimeZone>(t: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    t.format("%I:%M:%S%.3f %p").to_string()
}

/// Formats a duration with three significant digits in the largest unit
/// that keeps the value readable ("450 milliseconds", "4.5 seconds",
/// "2.25 hours").
pub fn to_time_string(span: Duration) -> String {
    let ms = span.as_secs_f64() * 1000.0;
    let secs = ms / 1000.0;
    let mins = secs / 60.0;
    let hours = mins / 60.0;
    let days = hours / 24.0;

    if ms < 1000.0 {
        format!("{} milliseconds", significant(ms, 3))
    } else if secs < 60.0 {
        format!("{} seconds", significant(secs, 3))
    } else if mins < 60.0 {
        format!("{} minutes", significant(mins, 3))
    } else if hours < 24.0 {
        format!("{} hours", significant(hours, 3))
    } else {
        format!("{} days", significant(days, 3))
    }
}

/// Formats a byte count: whole bytes and KB, two decimals for MB, three
/// for GB and above.
pub fn to_file_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    let size = bytes as f64;
    if bytes < 1024 {
        return format!("{bytes} Bytes");
    }
    if size < KB.powi(2) {
        return format!("{} KB", bytes / 1024);
    }
    if size < KB.powi(3) {
        return format!("{:.2} MB", size / KB.powi(2));
    }
    if size < KB.powi(4) {
        return format!("{:.3} GB", size / KB.powi(3));
    }
    if size < KB.powi(5) {
        return format!("{:.3} TB", size / KB.powi(4));
    }
    if size < KB.powi(6) {
        return format!("{:.3} PB", size / KB.powi(5));
    }
    format!("{:.3} EB", size / KB.powi(6))
}

/// Rounds to `digits` significant digits and drops trailing zeros.
fn significant(value: f64, digits: i32) -> String {
    if value == 0.0 {
        return "0".into();
    }
    let magnitude = value.abs().log10().floor() as i32 + 1;
    let decimals = (digits - magnitude).max(0) as usize;
    let text = format!("{value:.decimals$}");
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}
