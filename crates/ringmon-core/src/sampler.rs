//! CPU utilization capabilities.
//!
//! The gadget reads whole-system utilization through [`CpuSampler`]; the
//! attribution scan reads per-process CPU time through
//! [`ProcessCpuSampler`]. Both are implemented by the platform crate and
//! faked in tests.

use std::time::{Duration, SystemTime};

use crate::error::{SamplerError, ScanError};

/// Whole-system CPU utilization, one reading per tick.
pub trait CpuSampler: Send {
    /// Utilization since the previous call, as a percentage in 0..=100.
    fn sample(&mut self) -> Result<u8, SamplerError>;
}

/// One process as seen at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSnapshot {
    pub pid: u32,
    pub name: String,
    /// Title of the process's first visible top-level window, if any.
    pub window_title: Option<String>,
    /// Kernel plus user time consumed since the process started.
    pub total_cpu_time: Duration,
    pub working_set: u64,
    pub thread_count: u32,
    pub start_time: Option<SystemTime>,
}

/// Per-process CPU time source used by the attribution scan.
pub trait ProcessCpuSampler: Send + Sync {
    /// Lists running processes.
    fn processes(&self) -> Result<Vec<ProcessSnapshot>, ScanError>;

    /// Current total CPU time of one process.
    fn cpu_time(&self, pid: u32) -> Result<Duration, ScanError>;

    /// Number of logical processors used to normalize per-process usage.
    fn core_count(&self) -> usize {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    }

    /// Called on the scan thread before it starts working. The Windows
    /// sampler lowers the thread's priority here.
    fn prepare_scan_thread(&self) {}
}
