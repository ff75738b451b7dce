mod loader;
pub mod template;
pub mod theme;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::log::LogConfig;
use crate::rect::Position;

pub use loader::{config_dir, load, load_from, save, save_to, settings_path, try_load};
pub use theme::{GradientOverrides, Theme, ThemeConfig};

/// User settings for the gadget.
///
/// Loaded from `~/.config/ringmon/settings.toml`. Missing keys fall back
/// to defaults thanks to `#[serde(default)]`. Scalar keys come before the
/// tables so the file serializes as valid TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Utilization at or above which an attribution scan runs. `0` disables
    /// scanning.
    pub cpu_threshold: u8,
    /// Window side length in pixels.
    pub size: i32,
    /// Time between CPU samples.
    pub sample_interval_ms: u64,
    /// Lag between the primary ring and the echo ring.
    pub echo_delay_ms: u64,
    /// Last saved top-left corner of the primary gadget.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    pub logging: LogConfig,
    pub theme: ThemeConfig,
    pub scan: ScanConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cpu_threshold: 99,
            size: 120,
            sample_interval_ms: 2500,
            echo_delay_ms: 500,
            position: None,
            logging: LogConfig::default(),
            theme: ThemeConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

impl Settings {
    /// Clamps values to safe ranges.
    pub fn validate(&mut self) {
        self.cpu_threshold = self.cpu_threshold.min(100);
        self.size = self.size.clamp(48, 512);
        self.sample_interval_ms = self.sample_interval_ms.clamp(250, 60_000);
        self.echo_delay_ms = self.echo_delay_ms.min(self.sample_interval_ms);
        self.scan.validate();
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn echo_delay(&self) -> Duration {
        Duration::from_millis(self.echo_delay_ms)
    }
}

/// Attribution scan tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Processes with less total CPU time than this are skipped.
    pub min_cpu_time_secs: u64,
    /// Gap between the two CPU time reads of one process.
    pub sample_spacing_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            min_cpu_time_secs: 3,
            sample_spacing_ms: 1,
        }
    }
}

impl ScanConfig {
    pub fn validate(&mut self) {
        self.sample_spacing_ms = self.sample_spacing_ms.clamp(1, 1000);
    }

    pub fn min_cpu_time(&self) -> Duration {
        Duration::from_secs(self.min_cpu_time_secs)
    }

    pub fn sample_spacing(&self) -> Duration {
        Duration::from_millis(self.sample_spacing_ms)
    }
}

#[cfg(test)]
mod tests;
