//! Application settings loaded from an optional YAML file.
//!
//! Every section and field has a default, so an empty file (or no file at all)
//! yields the stock webcam setup. Command-line flags are applied on top by the
//! binary.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use crate::integration::{KeyCode, LoopSettings};
use crate::render::RenderConfig;
use crate::selection::{RegionSelector, SelectionMode};
use crate::tracker::{MotionTrackerConfig, TemplateConfig};

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "clicktrack.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid setting `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Which view the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    /// Select a target with the pointer and follow it
    #[default]
    Track,
    /// Highlight moving regions found by background subtraction
    Motion,
}

/// Backend used to follow a selected target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerKind {
    #[default]
    Kcf,
    Template,
}

/// Where frames come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Camera(i32),
    File(PathBuf),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub camera: i32,
    /// Video file to read instead of the camera
    pub file: Option<PathBuf>,
    /// Requested capture rate; `None` keeps the device default
    pub fps: Option<f64>,
    /// Requested capture size as `[width, height]`
    pub resolution: Option<[i32; 2]>,
    /// Convert frames to grayscale before tracking and display
    pub grayscale: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            camera: 0,
            file: None,
            fps: Some(60.0),
            resolution: None,
            grayscale: true,
        }
    }
}

impl SourceConfig {
    pub fn input(&self) -> Input {
        match &self.file {
            Some(path) => Input::File(path.clone()),
            None => Input::Camera(self.camera),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window title; the active mode picks one when absent
    pub name: Option<String>,
    /// Fixed window size as `[width, height]`; autosized when absent
    pub size: Option<[i32; 2]>,
}

/// Key bindings. Unset values fall back to the defaults of the active mode.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub quit_key: Option<KeyCode>,
    pub reset_key: Option<KeyCode>,
    pub poll_timeout_ms: Option<i32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
    pub mode: SelectionMode,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub kind: TrackerKind,
    pub template: TemplateConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MotionConfig {
    /// Frames of history kept by the background model
    pub history: i32,
    pub var_threshold: f64,
    pub detect_shadows: bool,
    /// Feed the background model single-channel frames
    pub grayscale_input: bool,
    /// Gaussian kernel applied to the foreground mask; 0 or 1 disables it
    pub blur_kernel: i32,
    /// Binarization cut-off for the blurred mask
    pub threshold: f64,
    pub erode_iterations: i32,
    pub dilate_iterations: i32,
    /// Contours at or below this area are ignored
    pub min_area: f64,
    pub highlight_stale_only: bool,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            history: 500,
            var_threshold: 16.0,
            detect_shadows: false,
            grayscale_input: false,
            blur_kernel: 5,
            threshold: 128.0,
            erode_iterations: 0,
            dilate_iterations: 0,
            min_area: 8000.0,
            highlight_stale_only: false,
        }
    }
}

impl MotionConfig {
    pub fn tracker_config(&self) -> MotionTrackerConfig {
        MotionTrackerConfig {
            min_area: self.min_area,
            highlight_stale_only: self.highlight_stale_only,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: Mode,
    pub source: SourceConfig,
    pub window: WindowConfig,
    pub controls: ControlsConfig,
    pub selection: SelectionConfig,
    pub render: RenderConfig,
    pub tracker: TrackerConfig,
    pub motion: MotionConfig,
}

impl AppConfig {
    /// Load settings from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists.
    ///
    /// An explicit path must exist and parse. Without one, a missing default
    /// file yields [`AppConfig::default`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_yaml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        config.validate()?;
        info!("loaded settings from {path:?}");
        Ok(config)
    }

    pub fn from_yaml(contents: &str) -> Result<Self, serde_yaml::Error> {
        // An empty document deserializes as unit, not as an empty map.
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(contents)
    }

    /// Reject values the trackers and overlays cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let template = &self.tracker.template;
        if template.search_radius < 0 {
            return Err(ConfigError::Invalid {
                field: "tracker.template.search_radius",
                reason: format!("must not be negative, got {}", template.search_radius),
            });
        }
        if !(template.max_mse.is_finite() && template.max_mse >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "tracker.template.max_mse",
                reason: format!("must be a finite non-negative number, got {}", template.max_mse),
            });
        }
        let ppcm = self.render.pixels_per_cm;
        if !(ppcm.is_finite() && ppcm > 0.0) {
            return Err(ConfigError::Invalid {
                field: "render.pixels_per_cm",
                reason: format!("must be a finite positive number, got {ppcm}"),
            });
        }
        Ok(())
    }

    /// Window title, defaulting to one per mode.
    pub fn window_name(&self) -> &str {
        match (&self.window.name, self.mode) {
            (Some(name), _) => name.as_str(),
            (None, Mode::Track) => "Select Rectangle",
            (None, Mode::Motion) => "Motion Detection",
        }
    }

    /// Key bindings for the configured mode.
    ///
    /// The tracking view quits on Esc and polls for 30 ms; the motion view
    /// quits on `q` and polls for 1 ms.
    pub fn loop_settings(&self) -> LoopSettings {
        let defaults = LoopSettings::default();
        let (quit_key, poll_timeout_ms) = match self.mode {
            Mode::Track => (defaults.quit_key, defaults.poll_timeout_ms),
            Mode::Motion => (KeyCode::from_char('q'), 1),
        };
        LoopSettings {
            poll_timeout_ms: self.controls.poll_timeout_ms.unwrap_or(poll_timeout_ms),
            quit_key: self.controls.quit_key.unwrap_or(quit_key),
            reset_key: self.controls.reset_key.unwrap_or(defaults.reset_key),
        }
    }

    /// Selector whose click-mode square is one centimeter wide.
    pub fn selector(&self) -> RegionSelector {
        let side = self.render.pixels_per_cm.round().max(1.0) as i32;
        RegionSelector::new(self.selection.mode, side)
    }
}
