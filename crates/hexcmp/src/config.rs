//! Configuration file support for hexcmp
//!
//! Config file location: `~/.config/hexcmp/config.toml` (XDG_CONFIG_HOME)
//!
//! Example config:
//! ```toml
//! [view]
//! bytes_per_row = 16
//! rows = 24
//! addr64 = false
//! help = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Viewport shape and display flags, saved with `s` and reloaded with `l`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewConfig {
    /// Bytes shown per row
    pub bytes_per_row: u32,
    /// Rows per panel
    pub rows: u32,
    /// Selected view index (absent = all views move together)
    pub selected: Option<usize>,
    /// Show 64-bit addresses
    pub addr64: bool,
    /// Show the key help panel
    pub help: bool,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            bytes_per_row: 16,
            rows: 24,
            selected: None,
            addr64: false,
            help: false,
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub view: ViewConfig,
}

impl Config {
    /// Get all possible config file paths in priority order
    fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        // 1. XDG_CONFIG_HOME (if set)
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("hexcmp").join("config.toml"));
        }

        // 2. ~/.config/hexcmp/config.toml (XDG default, works on all platforms)
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".config").join("hexcmp").join("config.toml"));
        }

        // 3. Platform-specific config dir (~/Library/Application Support on macOS)
        if let Some(config_dir) = dirs::config_dir() {
            let platform_path = config_dir.join("hexcmp").join("config.toml");
            // Avoid duplicate if it's the same as ~/.config
            if !paths.contains(&platform_path) {
                paths.push(platform_path);
            }
        }

        paths
    }

    /// Get the first existing config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_paths().into_iter().find(|p| p.exists())
    }

    /// Load config from XDG config path
    /// Returns default config if file doesn't exist or can't be parsed
    pub fn load() -> Self {
        Self::config_path()
            .and_then(|path| std::fs::read_to_string(&path).ok())
            .and_then(|content| {
                toml::from_str(&content)
                    .map_err(|e| {
                        eprintln!("Warning: Failed to parse config: {}", e);
                        e
                    })
                    .ok()
            })
            .unwrap_or_default()
    }

    /// Write the config back, preferring the path it was loaded from and
    /// falling back to the highest-priority location.
    pub fn save(&self) -> anyhow::Result<PathBuf> {
        let path = Self::config_path()
            .or_else(|| Self::config_paths().into_iter().next())
            .ok_or_else(|| anyhow::anyhow!("no config directory available"))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: Config = toml::from_str("[view]\nrows = 10\n").unwrap();
        assert_eq!(config.view.rows, 10);
        assert_eq!(config.view.bytes_per_row, 16);
        assert_eq!(config.view.selected, None);
        assert!(!config.view.addr64);
    }

    #[test]
    fn round_trips_through_toml() {
        let mut config = Config::default();
        config.view.bytes_per_row = 8;
        config.view.selected = Some(2);
        config.view.addr64 = true;

        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.view.bytes_per_row, 8);
        assert_eq!(back.view.selected, Some(2));
        assert!(back.view.addr64);
    }

    #[test]
    fn garbage_input_is_rejected() {
        assert!(toml::from_str::<Config>("view = 3").is_err());
    }
}
