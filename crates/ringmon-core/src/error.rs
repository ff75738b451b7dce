use thiserror::Error;

/// A boxed error type for platform glue code.
///
/// Window creation, message pumps and the CLI use this. Operations whose
/// callers must choose between degrading and propagating return one of the
/// typed errors below instead.
pub type WindowResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Failure to read system-wide CPU utilization.
#[derive(Debug, Clone, Error)]
pub enum SamplerError {
    /// The OS counter could not be created. Fatal to the sampling feature.
    #[error("CPU counter unavailable: {0}")]
    CounterUnavailable(String),
    /// A single read failed; the next tick may succeed.
    #[error("CPU counter read failed: {0}")]
    ReadFailed(String),
}

/// Failure while enumerating or measuring processes during an attribution scan.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The process list itself could not be obtained. Ends the scan.
    #[error("process enumeration failed: {0}")]
    Enumeration(String),
    /// The process exists but we may not query it.
    #[error("access denied to process {pid}")]
    AccessDenied { pid: u32 },
    /// The process went away while it was being measured.
    #[error("process {pid} exited during the scan")]
    ProcessExited { pid: u32 },
    /// Any other OS failure for a single process.
    #[error("process {pid}: {message}")]
    Platform { pid: u32, message: String },
}

impl ScanError {
    /// Returns the process this error belongs to, if any.
    pub fn pid(&self) -> Option<u32> {
        match self {
            Self::Enumeration(_) => None,
            Self::AccessDenied { pid }
            | Self::ProcessExited { pid }
            | Self::Platform { pid, .. } => Some(*pid),
        }
    }
}

/// Failure to query or change the always-on-top style of a window.
#[derive(Debug, Error)]
pub enum StyleError {
    /// The window handle is gone (e.g. the window was destroyed).
    #[error("window handle is no longer valid")]
    InvalidWindow,
    #[error("window style call failed: {0}")]
    Platform(String),
}

/// Failure to read or write the settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine the settings directory")]
    NoConfigDir,
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("could not serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),
}

impl SettingsError {
    /// Returns true when the settings file simply does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound)
    }
}
