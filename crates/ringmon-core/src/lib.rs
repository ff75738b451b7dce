pub mod attribution;
pub mod color;
pub mod context;
pub mod diagnostic;
pub mod dialog;
pub mod error;
pub mod format;
pub mod gadget;
pub mod log;
pub mod palette;
pub mod rect;
pub mod ring;
pub mod sampler;
pub mod scheduler;
pub mod settings;
pub mod tier;
pub mod topmost;

#[cfg(test)]
mod fakes;

pub use attribution::{AttributionRecord, AttributionScanner, EvaluationLock, ScanSummary};
pub use color::Color;
pub use context::Context;
pub use dialog::{DialogRequest, Dialogs};
pub use error::{SamplerError, ScanError, SettingsError, StyleError, WindowResult};
pub use gadget::{Gadget, GadgetHost, Role, SharedSettings, Task, run_until};
pub use log::{FileLog, Level, LogSink, MemoryLog};
pub use palette::{Brush, Palette};
pub use rect::{Position, Rect};
pub use ring::{Ring, RingLayout};
pub use sampler::{CpuSampler, ProcessCpuSampler, ProcessSnapshot};
pub use scheduler::Scheduler;
pub use settings::Settings;
pub use tier::ColorTier;
pub use topmost::{TopmostEnforcer, WindowStyler};
