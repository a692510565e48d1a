//! Render configuration resource.
//!
//! Manages renderer settings loaded from an INI configuration file.
//! Provides defaults for safe startup and methods to load/save
//! configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [viewport]
//! width = 800
//! height = 600
//!
//! [renderer]
//! force_software = false
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_VIEWPORT_WIDTH: u32 = 800;
const DEFAULT_VIEWPORT_HEIGHT: u32 = 600;
const DEFAULT_FORCE_SOFTWARE: bool = false;
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Render configuration resource.
///
/// Stores the viewport dimensions the selected renderer backend will be
/// sized to, and whether to skip the capability probe and force the
/// software backend (useful on machines without a usable adapter).
#[derive(Resource, Debug, Clone)]
pub struct RenderConfig {
    /// Viewport width in pixels.
    pub viewport_width: u32,
    /// Viewport height in pixels.
    pub viewport_height: u32,
    /// Skip the capability probe and always use the software backend.
    pub force_software: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            force_software: DEFAULT_FORCE_SOFTWARE,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    #[allow(dead_code)]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [viewport] section
        if let Some(width) = config.getuint("viewport", "width").ok().flatten() {
            self.viewport_width = width as u32;
        }
        if let Some(height) = config.getuint("viewport", "height").ok().flatten() {
            self.viewport_height = height as u32;
        }

        // [renderer] section
        if let Some(force) = config.getbool("renderer", "force_software").ok().flatten() {
            self.force_software = force;
        }

        info!(
            "Loaded config: {}x{} viewport, force_software={}",
            self.viewport_width, self.viewport_height, self.force_software
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    #[allow(dead_code)]
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("viewport", "width", Some(self.viewport_width.to_string()));
        config.set("viewport", "height", Some(self.viewport_height.to_string()));
        config.set(
            "renderer",
            "force_software",
            Some(self.force_software.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }

    /// Get the viewport size.
    pub fn viewport_size(&self) -> (u32, u32) {
        (self.viewport_width, self.viewport_height)
    }
}
