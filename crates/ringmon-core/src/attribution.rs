//! Best-effort search for the processes behind a CPU spike.
//!
//! When the primary gadget sees utilization at or above the configured
//! threshold it asks the [`AttributionScanner`] to run. At most one scan
//! runs at a time: the request is dropped when the [`EvaluationLock`] is
//! already held. The scan measures each long-running process over a very
//! short window and logs the ones that look responsible. The scan itself
//! shows up in its own results now and then.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use crate::context::Context;
use crate::error::ScanError;
use crate::format::{local, log_stamp, to_file_size, to_time_string};
use crate::log::LogSink;
use crate::sampler::{ProcessCpuSampler, ProcessSnapshot};
use crate::settings::ScanConfig;
use crate::{log_debug, log_error, log_info};

/// Single-flight flag for attribution scans.
///
/// `try_begin` polls and sets; it never blocks waiting for a running scan.
#[derive(Clone, Default)]
pub struct EvaluationLock {
    busy: Arc<Mutex<bool>>,
}

impl EvaluationLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the lock if it is free. The returned guard releases it when
    /// dropped, including during unwinding.
    pub fn try_begin(&self) -> Option<EvaluationGuard> {
        let mut busy = self.busy.lock().unwrap_or_else(|e| e.into_inner());
        if *busy {
            return None;
        }
        *busy = true;
        Some(EvaluationGuard {
            busy: Arc::clone(&self.busy),
        })
    }

    /// Returns true while a scan holds the lock.
    pub fn is_busy(&self) -> bool {
        *self.busy.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Proof that the holder owns the [`EvaluationLock`].
pub struct EvaluationGuard {
    busy: Arc<Mutex<bool>>,
}

impl Drop for EvaluationGuard {
    fn drop(&mut self) {
        *self.busy.lock().unwrap_or_else(|e| e.into_inner()) = false;
    }
}

/// A process that looked responsible for the spike.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributionRecord {
    pub pid: u32,
    pub name: String,
    pub window_title: Option<String>,
    /// CPU share normalized by core count.
    pub cpu_percent: f32,
    pub total_cpu_time: Duration,
    pub working_set: u64,
    pub thread_count: u32,
    pub start_time: Option<SystemTime>,
}

impl AttributionRecord {
    fn new(p: &ProcessSnapshot, cpu_percent: f32) -> Self {
        Self {
            pid: p.pid,
            name: p.name.clone(),
            window_title: p.window_title.clone(),
            cpu_percent,
            total_cpu_time: p.total_cpu_time,
            working_set: p.working_set,
            thread_count: p.thread_count,
            start_time: p.start_time,
        }
    }

    /// The log block for this record: a dashed separator followed by one
    /// aligned line per field.
    pub fn log_lines(&self) -> Vec<String> {
        let mut lines = vec!["-".repeat(42), format!("  Process.: {}", self.name)];
        lines.push(format!("  PID.....: {}", self.pid));
        if let Some(title) = self.window_title.as_deref().filter(|t| !t.is_empty()) {
            lines.push(format!("  Title...: {title}"));
        }
        lines.push(format!("  CPU.....: {:.1}%", self.cpu_percent));
        lines.push(format!("  Time....: {}", to_time_string(self.total_cpu_time)));
        lines.push(format!("  Memory..: {}", to_file_size(self.working_set)));
        lines.push(format!("  Threads.: {}", self.thread_count));
        let started = self
            .start_time
            .map(|t| log_stamp(&local(t)))
            .unwrap_or_else(|| "unknown".into());
        lines.push(format!("  Started.: {started}"));
        lines
    }
}

/// Counts for one completed scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Processes that were measured.
    pub examined: usize,
    /// Processes below the minimum CPU time.
    pub skipped: usize,
    /// Processes logged as likely offenders.
    pub offenders: usize,
    /// Processes that could not be measured.
    pub errors: usize,
}

/// Runs attribution scans against a [`ProcessCpuSampler`].
pub struct AttributionScanner {
    processes: Arc<dyn ProcessCpuSampler>,
    context: Context,
    config: ScanConfig,
}

impl AttributionScanner {
    pub fn new(processes: Arc<dyn ProcessCpuSampler>, context: Context, config: ScanConfig) -> Self {
        Self {
            processes,
            context,
            config,
        }
    }

    /// Starts a background scan unless one is already running.
    ///
    /// Returns true if a scan was started. A busy lock drops the request.
    pub fn trigger(self: &Arc<Self>, threshold: u8) -> bool {
        let Some(guard) = self.context.evaluation.try_begin() else {
            log_debug!(self.context.log, "attribution scan already running, request dropped");
            return false;
        };

        let scanner = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("ringmon-scan".into())
            .spawn(move || {
                let _guard = guard;
                scanner.processes.prepare_scan_thread();
                scanner.scan(threshold, |_| {});
            });

        match spawned {
            Ok(_) => true,
            Err(e) => {
                log_error!(self.context.log, "failed to start attribution scan: {e}");
                false
            }
        }
    }

    /// Runs a scan on the calling thread if the lock is free.
    pub fn run_exclusive(
        &self,
        threshold: u8,
        on_record: impl FnMut(&AttributionRecord),
    ) -> Option<ScanSummary> {
        let _guard = self.context.evaluation.try_begin()?;
        Some(self.scan(threshold, on_record))
    }

    /// Measures every long-running process and logs the likely offenders.
    ///
    /// Does not take the evaluation lock; callers hold it.
    pub fn scan(&self, threshold: u8, mut on_record: impl FnMut(&AttributionRecord)) -> ScanSummary {
        let log = &self.context.log;
        let mut summary = ScanSummary::default();

        let snapshots = match self.processes.processes() {
            Ok(list) => list,
            Err(e) => {
                log_error!(log, "{e}");
                return summary;
            }
        };

        let cores = self.processes.core_count().max(1);
        let limit = f32::from(threshold) / cores as f32;
        let min_time = self.config.min_cpu_time();

        for p in &snapshots {
            if p.total_cpu_time < min_time {
                summary.skipped += 1;
                continue;
            }
            summary.examined += 1;

            let percent = match self.measure(p.pid) {
                // Counter granularity can exceed a short spacing window.
                Ok(percent) => (percent / cores as f32).min(100.0),
                Err(e) => {
                    summary.errors += 1;
                    log_error!(log, "{} ({}): {e}", p.name, p.pid);
                    continue;
                }
            };

            if percent >= limit {
                summary.offenders += 1;
                let record = AttributionRecord::new(p, percent);
                write_record(log, &record);
                on_record(&record);
            }
        }

        log_debug!(
            log,
            "attribution scan finished: {} examined, {} skipped, {} offenders, {} errors",
            summary.examined,
            summary.skipped,
            summary.offenders,
            summary.errors
        );
        summary
    }

    /// CPU use of one process over `sample_spacing`, in percent of one core.
    fn measure(&self, pid: u32) -> Result<f32, ScanError> {
        let spacing = self.config.sample_spacing();
        let started = Instant::now();
        let first = self.processes.cpu_time(pid)?;
        thread::sleep(spacing);
        let second = self.processes.cpu_time(pid)?;
        let wall = started.elapsed().max(spacing).max(Duration::from_micros(1));

        let busy = second.saturating_sub(first);
        Ok((busy.as_secs_f64() / wall.as_secs_f64() * 100.0) as f32)
    }
}

fn write_record(log: &Arc<dyn LogSink>, record: &AttributionRecord) {
    for line in record.log_lines() {
        log_info!(log, "{line}");
    }
}

#[cfg(test)]
mod tests;
