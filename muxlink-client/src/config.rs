//! Client configuration
//!
//! Loaded from the muxlink config directory as TOML. A missing file is
//! normal and yields defaults; an unreadable or malformed file logs a
//! warning and also falls back to defaults rather than refusing to start.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::link::LinkConfig;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// tmux binary to spawn.
    pub tmux_bin: String,
    /// Pane width when the CLI does not override it.
    pub default_cols: u16,
    /// Pane height when the CLI does not override it.
    pub default_rows: u16,
    /// Bound on the output event queue between reader and consumer.
    pub event_queue_capacity: usize,
}

impl Default for ClientConfig {
    fn default() -> ClientConfig {
        ClientConfig {
            tmux_bin: "tmux".to_string(),
            default_cols: 80,
            default_rows: 24,
            event_queue_capacity: 100,
        }
    }
}

impl ClientConfig {
    /// Load from the standard config path.
    pub fn load() -> ClientConfig {
        Self::load_from(&muxlink_utils::paths::config_file())
    }

    fn load_from(path: &Path) -> ClientConfig {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return ClientConfig::default();
        }
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to read config, using defaults");
                return ClientConfig::default();
            }
        };
        match toml::from_str(&text) {
            Ok(config) => config,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "failed to parse config, using defaults");
                ClientConfig::default()
            }
        }
    }

    /// Link settings derived from this config.
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            tmux_bin: self.tmux_bin.clone(),
            event_capacity: self.event_queue_capacity,
        }
    }
}
