use std::fs;
use std::path::{Path, PathBuf};

use super::Settings;
use crate::error::SettingsError;

/// Returns the settings directory: `~/.config/ringmon/`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".config").join("ringmon"))
}

/// Returns the settings file path: `~/.config/ringmon/settings.toml`.
pub fn settings_path() -> Option<PathBuf> {
    config_dir().map(|d| d.join("settings.toml"))
}

/// Tries to load and parse `settings.toml`.
pub fn try_load() -> Result<Settings, SettingsError> {
    let path = settings_path().ok_or(SettingsError::NoConfigDir)?;
    load_from(&path)
}

/// Loads settings from an explicit path and clamps them via
/// [`Settings::validate`].
pub fn load_from(path: &Path) -> Result<Settings, SettingsError> {
    let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let mut settings: Settings = toml::from_str(&content).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    settings.validate();
    Ok(settings)
}

/// Loads settings, falling back to defaults.
///
/// A missing file silently yields defaults. Any other failure also yields
/// defaults and is returned alongside so the caller can log it once a log
/// sink exists.
pub fn load() -> (Settings, Option<SettingsError>) {
    or_default(try_load())
}

fn or_default(result: Result<Settings, SettingsError>) -> (Settings, Option<SettingsError>) {
    match result {
        Ok(settings) => (settings, None),
        Err(e) if e.is_not_found() => (Settings::default(), None),
        Err(e) => (Settings::default(), Some(e)),
    }
}

/// Writes settings to `~/.config/ringmon/settings.toml`.
pub fn save(settings: &Settings) -> Result<(), SettingsError> {
    let path = settings_path().ok_or(SettingsError::NoConfigDir)?;
    save_to(settings, &path)
}

/// Writes settings to an explicit path, creating parent directories.
pub fn save_to(settings: &Settings, path: &Path) -> Result<(), SettingsError> {
    let io_err = |source| SettingsError::Io {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(settings)?;
    fs::write(path, content).map_err(io_err)
}
