// filemarks platform paths for Linux
// Config: ~/.config/filemarks
// Data:   ~/.local/share/filemarks

use std::env;
use std::path::PathBuf;

/// Uses `$XDG_CONFIG_HOME/filemarks` if set, otherwise `~/.config/filemarks`.
pub fn get_config_dir() -> PathBuf {
    resolve(env::var("XDG_CONFIG_HOME").ok(), env::var("HOME").ok(), &[".config"])
}

/// Uses `$XDG_DATA_HOME/filemarks` if set, otherwise `~/.local/share/filemarks`.
pub fn get_data_dir() -> PathBuf {
    resolve(
        env::var("XDG_DATA_HOME").ok(),
        env::var("HOME").ok(),
        &[".local", "share"],
    )
}

fn resolve(xdg: Option<String>, home: Option<String>, fallback: &[&str]) -> PathBuf {
    match xdg.filter(|v| !v.is_empty()) {
        Some(base) => PathBuf::from(base).join("filemarks"),
        None => {
            let mut path = PathBuf::from(home.unwrap_or_else(|| String::from("/tmp")));
            path.extend(fallback);
            path.join("filemarks")
        }
    }
}
