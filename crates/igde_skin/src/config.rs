//! Skin editor settings.
//!
//! Persistent settings that survive editor restarts.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Skin editor settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkinEditorConfig {
    /// Dead zone in view pixels per axis before a drag starts editing
    pub drag_threshold: i32,
    /// Edge length of the square selection markers in view pixels
    pub marker_size: i32,
    /// Axis vectors shorter than this are not used as divisor or direction
    pub min_axis_length: f32,
    /// Maximum number of undo steps
    pub history_size: usize,
    /// Canvas zoom in percent
    pub zoom: i32,
}

impl Default for SkinEditorConfig {
    fn default() -> Self {
        Self {
            drag_threshold: 3,
            marker_size: 9,
            min_axis_length: 0.5,
            history_size: 100,
            zoom: 100,
        }
    }
}

impl SkinEditorConfig {
    pub const MIN_ZOOM: i32 = 25;
    pub const MAX_ZOOM: i32 = 800;

    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.zoom = config.zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        log::info!("Loaded skin editor settings from {:?}", path);
        Ok(config)
    }

    /// Save settings to a TOML file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        log::info!("Saved skin editor settings to {:?}", path);
        Ok(())
    }

    /// Get the default settings path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("igde");
            p.push("skin_editor.toml");
            p
        })
    }

    /// Load from the default path, falling back to defaults if the file is
    /// missing or unreadable.
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            log::info!("No skin editor settings at {:?}, using defaults", path);
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load skin editor settings: {}", e);
                Self::default()
            }
        }
    }
}
