// filemarks platform abstraction
// Resolves where the config file and the bookmark database live.
//
// Uses `cfg(target_os)` to select the platform implementation at compile time.

use std::path::PathBuf;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

/// Returns the platform-specific configuration directory.
///
/// - **Linux**: `~/.config/filemarks` (or `$XDG_CONFIG_HOME/filemarks`)
/// - **macOS**: `~/Library/Application Support/filemarks`
/// - **Windows**: `%APPDATA%/filemarks`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_config_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_config_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_config_dir()
    }
}

/// Returns the platform-specific data directory.
///
/// - **Linux**: `~/.local/share/filemarks` (or `$XDG_DATA_HOME/filemarks`)
/// - **macOS**: `~/Library/Application Support/filemarks`
/// - **Windows**: `%APPDATA%/filemarks`
pub fn get_data_dir() -> PathBuf {
    #[cfg(target_os = "linux")]
    {
        linux::get_data_dir()
    }
    #[cfg(target_os = "macos")]
    {
        macos::get_data_dir()
    }
    #[cfg(target_os = "windows")]
    {
        windows::get_data_dir()
    }
}
