//! System-wide CPU utilization from `GetSystemTimes`.
//!
//! Usage is the busy share of the kernel + user time elapsed between two
//! samples. The sampler keeps the previous sample, so one instance must
//! live for the whole life of a gadget.

use ringmon_core::{CpuSampler, SamplerError};
use windows::Win32::Foundation::FILETIME;
use windows::Win32::System::Threading::GetSystemTimes;

/// Tracks CPU usage across successive samples.
pub struct SystemCpuSampler {
    prev_idle: u64,
    prev_total: u64,
}

impl SystemCpuSampler {
    /// Creates a sampler and takes the first baseline reading.
    pub fn new() -> Result<Self, SamplerError> {
        let (idle, kernel, user) =
            system_times().map_err(|e| SamplerError::CounterUnavailable(e.message()))?;
        Ok(Self {
            prev_idle: idle,
            prev_total: kernel + user,
        })
    }
}

impl CpuSampler for SystemCpuSampler {
    /// The first call after `new()` returns the usage since creation.
    fn sample(&mut self) -> Result<u8, SamplerError> {
        let (idle, kernel, user) =
            system_times().map_err(|e| SamplerError::ReadFailed(e.message()))?;
        let total = kernel + user;

        let usage = busy_percent(
            idle.saturating_sub(self.prev_idle),
            total.saturating_sub(self.prev_total),
        );
        self.prev_idle = idle;
        self.prev_total = total;
        Ok(usage)
    }
}

/// Busy share of `delta_total`, 0–100. Kernel time includes idle time.
fn busy_percent(delta_idle: u64, delta_total: u64) -> u8 {
    if delta_total == 0 {
        return 0;
    }
    let busy = delta_total.saturating_sub(delta_idle);
    (busy * 100 / delta_total).min(100) as u8
}

/// Queries idle, kernel, and user times as 64-bit tick counts.
fn system_times() -> windows::core::Result<(u64, u64, u64)> {
    let mut idle = FILETIME::default();
    let mut kernel = FILETIME::default();
    let mut user = FILETIME::default();

    // SAFETY: the three out-pointers reference live stack values.
    unsafe { GetSystemTimes(Some(&mut idle), Some(&mut kernel), Some(&mut user))? };

    Ok((ft_to_u64(idle), ft_to_u64(kernel), ft_to_u64(user)))
}

pub(crate) fn ft_to_u64(ft: FILETIME) -> u64 {
    u64::from(ft.dwLowDateTime) | (u64::from(ft.dwHighDateTime) << 32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_percent_handles_idle_and_saturated() {
        // Assert
        assert_eq!(busy_percent(0, 0), 0);
        assert_eq!(busy_percent(100, 100), 0);
        assert_eq!(busy_percent(25, 100), 75);
        assert_eq!(busy_percent(0, 100), 100);
    }

    #[test]
    fn filetime_halves_combine() {
        // Arrange
        let ft = FILETIME {
            dwLowDateTime: 1,
            dwHighDateTime: 2,
        };

        // Act / Assert
        assert_eq!(ft_to_u64(ft), (2u64 << 32) | 1);
    }

    #[test]
    fn live_sampler_reports_a_percentage() {
        // Arrange
        let mut sampler = SystemCpuSampler::new().unwrap();

        // Act
        std::thread::sleep(std::time::Duration::from_millis(50));
        let v = sampler.sample().unwrap();

        // Assert
        assert!(v <= 100);
    }
}
