//! Path utilities for muxlink
//!
//! XDG Base Directory locations for configuration, state, and logs.

use std::path::PathBuf;

use directories::ProjectDirs;

/// Application identifier for XDG directories
const APP_NAME: &str = "muxlink";

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// Get the configuration directory
///
/// Location: `$XDG_CONFIG_HOME/muxlink` or `~/.config/muxlink`
pub fn config_dir() -> PathBuf {
    project_dirs()
        .map(|p| p.config_dir().to_path_buf())
        .unwrap_or_else(|| fallback_home().join(".config").join(APP_NAME))
}

/// Get the main configuration file path
///
/// Location: `$XDG_CONFIG_HOME/muxlink/config.toml`
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the state directory
///
/// Location: `$XDG_STATE_HOME/muxlink` or `~/.local/state/muxlink`
pub fn state_dir() -> PathBuf {
    project_dirs()
        .and_then(|p| p.state_dir().map(|d| d.to_path_buf()))
        .unwrap_or_else(|| {
            fallback_home()
                .join(".local")
                .join("state")
                .join(APP_NAME)
        })
}

/// Get the log directory
///
/// Location: `$XDG_STATE_HOME/muxlink/log`
pub fn log_dir() -> PathBuf {
    state_dir().join("log")
}

/// Last-resort home directory when the platform lookup fails
fn fallback_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}
