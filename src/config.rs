// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Application configuration.
//!
//! Settings are read from a YAML file named by the `CURVETRACK_CONFIG`
//! environment variable, or `curvetrack.yaml` in the working directory.
//! Every field has a default, so a partial file is fine and a missing
//! file yields [`AppConfig::default`].

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "CURVETRACK_CONFIG";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "curvetrack.yaml";

/// Log verbosity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to log crate's LevelFilter.
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// User-tunable settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    /// Maximum number of commands kept on the undo stack
    pub max_undo_history: usize,
    /// Moving-average window used by the smooth command (odd)
    pub smoothing_window: usize,
    /// Point picking radius in screen pixels
    pub pick_radius: f32,
    /// File extensions recognised as image sequence frames
    pub image_extensions: Vec<String>,
    /// Zoom multiplier per zoom in/out step
    pub zoom_step: f64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            max_undo_history: 100,
            smoothing_window: 5,
            pick_radius: 8.0,
            image_extensions: ["png", "jpg", "jpeg", "tif", "tiff", "bmp", "exr"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            zoom_step: 1.2,
        }
    }
}

impl AppConfig {
    /// Load the configuration from the standard locations.
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_yaml(&yaml).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)?;
        Ok(config.sanitized())
    }

    /// Resolve which file to read, if any.
    fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Some(PathBuf::from(path));
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        local.exists().then_some(local)
    }

    /// Force values into their usable ranges.
    fn sanitized(mut self) -> Self {
        self.max_undo_history = self.max_undo_history.max(1);
        if self.smoothing_window < 3 {
            self.smoothing_window = 3;
        }
        if self.smoothing_window % 2 == 0 {
            self.smoothing_window += 1;
        }
        if self.zoom_step.is_nan() || self.zoom_step <= 1.0 {
            log::warn!("zoom_step must be greater than 1, got {}", self.zoom_step);
            self.zoom_step = AppConfig::default().zoom_step;
        }
        self.pick_radius = self.pick_radius.max(1.0);
        self
    }

    /// Whether a path has one of the configured image extensions.
    pub fn is_image_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.image_extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = AppConfig::from_yaml("max_undo_history: 20\nlog_level: debug\n").unwrap();
        assert_eq!(config.max_undo_history, 20);
        assert_eq!(config.log_level, LogLevel::Debug);
        assert_eq!(config.smoothing_window, 5);
        assert_eq!(config.pick_radius, 8.0);
    }

    #[test]
    fn test_sanitize_smoothing_window() {
        let config = AppConfig::from_yaml("smoothing_window: 4\n").unwrap();
        assert_eq!(config.smoothing_window, 5);

        let config = AppConfig::from_yaml("smoothing_window: 1\n").unwrap();
        assert_eq!(config.smoothing_window, 3);
    }

    #[test]
    fn test_sanitize_zoom_step_and_history() {
        let config = AppConfig::from_yaml("zoom_step: 0.5\nmax_undo_history: 0\n").unwrap();
        assert_eq!(config.zoom_step, 1.2);
        assert_eq!(config.max_undo_history, 1);
    }

    #[test]
    fn test_malformed_yaml_is_error() {
        assert!(AppConfig::from_yaml("max_undo_history: [nope").is_err());
    }

    #[test]
    fn test_is_image_file() {
        let config = AppConfig::default();
        assert!(config.is_image_file(Path::new("plate.0001.PNG")));
        assert!(config.is_image_file(Path::new("/shots/a/plate.0002.exr")));
        assert!(!config.is_image_file(Path::new("notes.txt")));
        assert!(!config.is_image_file(Path::new("no_extension")));
    }
}
