#![cfg(windows)]

/// System-wide CPU sampler.
pub mod cpu;

/// `MessageBoxW` dialogs.
pub mod dialog;

/// Per-monitor DPI awareness.
pub mod dpi;

/// Window titles by process.
pub mod enumerate;

/// Single-instance named mutex.
pub mod instance;

/// Primary monitor work area.
pub mod monitor;

/// The gadget window and its message loop.
pub mod overlay;

/// Process priority.
pub mod priority;

/// Per-process CPU sampler for attribution scans.
pub mod process;

/// Layered-window ring painter.
pub mod render;

/// Window type wrapping a Win32 `HWND`.
pub mod window;

pub use cpu::SystemCpuSampler;
pub use dialog::MessageBoxDialogs;
pub use instance::InstanceGuard;
pub use overlay::Launcher;
pub use process::WinProcessSampler;
pub use window::Window;
