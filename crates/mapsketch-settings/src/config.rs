//! Configuration for the editing engine
//!
//! Configuration is organized into logical sections:
//! - Editor behaviour (validation, throttling, handle tolerances, history)
//! - Snapping (modes, pixel tolerance, highlight policy)
//! - Topology tolerances (split buffer, merge precision, reshape strategy)
//! - Shape styles (normal, error, selected)
//!
//! Every section carries `#[serde(default)]` so partial files load cleanly.

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Editor behaviour settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Allow polygon rings to self-intersect while drawing
    pub allow_self_intersect: bool,
    /// Invoke a state listener with the current state when it subscribes
    pub fire_on_subscribe: bool,
    /// Minimum interval between handled pointer moves
    pub move_throttle_ms: u64,
    /// Hit radius for vertex and midpoint handles, in screen pixels
    pub handle_tolerance_px: f64,
    /// Trailing vertices closer than this are treated as duplicates
    pub duplicate_tolerance_px: f64,
    /// Position of midpoint handles along their edge (0..1)
    pub midpoint_ratio: f64,
    /// Maximum number of history snapshots kept per edit session
    pub max_history: usize,
    /// Segment count used when a circle is exported or clipped as a polygon
    pub circle_segments: u32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            allow_self_intersect: true,
            fire_on_subscribe: true,
            move_throttle_ms: 50,
            handle_tolerance_px: 8.0,
            duplicate_tolerance_px: 1.0,
            midpoint_ratio: 0.5,
            max_history: 100,
            circle_segments: 64,
        }
    }
}

/// Which reference features a point may snap to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapModes {
    pub vertex: bool,
    pub edge: bool,
}

impl Default for SnapModes {
    fn default() -> Self {
        Self {
            vertex: true,
            edge: true,
        }
    }
}

/// Feedback given when a snap happens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapHighlight {
    /// No feedback
    None,
    /// Remember the snapped target so the host can highlight it
    #[default]
    Target,
}

/// Snapping settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapSettings {
    pub enabled: bool,
    pub modes: SnapModes,
    /// Snap radius in screen pixels
    pub tolerance_px: f64,
    pub highlight: SnapHighlight,
}

impl Default for SnapSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            modes: SnapModes::default(),
            tolerance_px: 10.0,
            highlight: SnapHighlight::Target,
        }
    }
}

/// How a cutting reshape resolves several candidate fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReshapeStrategy {
    /// Keep the fragment with the largest perimeter
    #[default]
    Auto,
    /// Return every fragment and let the caller choose
    Manual,
}

impl std::fmt::Display for ReshapeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Manual => write!(f, "manual"),
        }
    }
}

/// Topology tolerances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologySettings {
    /// Full width of the thin polygon a cutting line is buffered into
    pub split_buffer_width: f64,
    /// Decimal places coordinates are rounded to before a union
    pub merge_precision: u32,
    /// Fragments smaller than this area are discarded
    pub min_fragment_area: f64,
    pub reshape_strategy: ReshapeStrategy,
}

impl Default for TopologySettings {
    fn default() -> Self {
        Self {
            split_buffer_width: 1e-6,
            merge_precision: 8,
            min_fragment_area: 1e-12,
            reshape_strategy: ReshapeStrategy::Auto,
        }
    }
}

/// Visual style of a shape; carried with the geometry, rendered by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeStyle {
    pub stroke_color: String,
    pub stroke_width: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
    /// Dash pattern such as `"4 2"`
    pub dash: Option<String>,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#3388ff".to_string(),
            stroke_width: 2.0,
            fill_color: "#3388ff".to_string(),
            fill_opacity: 0.2,
            dash: None,
        }
    }
}

/// Styles applied in each shape condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleSettings {
    pub normal: ShapeStyle,
    /// Applied while the in-progress geometry fails validation
    pub error: ShapeStyle,
    /// Applied to shapes in the topology selection
    pub selected: ShapeStyle,
}

impl Default for StyleSettings {
    fn default() -> Self {
        Self {
            normal: ShapeStyle::default(),
            error: ShapeStyle {
                stroke_color: "#e53935".to_string(),
                fill_color: "#e53935".to_string(),
                dash: Some("4 4".to_string()),
                ..ShapeStyle::default()
            },
            selected: ShapeStyle {
                stroke_color: "#ffb300".to_string(),
                stroke_width: 3.0,
                fill_color: "#ffb300".to_string(),
                fill_opacity: 0.3,
                dash: None,
            },
        }
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub editor: EditorSettings,
    pub snapping: SnapSettings,
    pub topology: TopologySettings,
    pub styles: StyleSettings,
}

#[derive(Clone, Copy)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl Config {
    /// Create default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML, chosen by extension)
    pub fn load(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML, chosen by extension)
    pub fn save(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let format = format_of(path)?;

        let content = match format {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Load from `path` when it exists, otherwise fall back to defaults
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Platform configuration file location
    pub fn default_config_path() -> SettingsResult<PathBuf> {
        let dir = dirs::config_dir().ok_or_else(|| {
            SettingsError::ConfigDirectory("no platform config directory".to_string())
        })?;
        Ok(dir.join("mapsketch").join("config.toml"))
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let editor = &self.editor;
        if editor.handle_tolerance_px <= 0.0 || !editor.handle_tolerance_px.is_finite() {
            return Err(ConfigError::out_of_range(
                "editor.handle_tolerance_px",
                editor.handle_tolerance_px,
            ));
        }
        if editor.duplicate_tolerance_px < 0.0 || !editor.duplicate_tolerance_px.is_finite() {
            return Err(ConfigError::out_of_range(
                "editor.duplicate_tolerance_px",
                editor.duplicate_tolerance_px,
            ));
        }
        if !(editor.midpoint_ratio > 0.0 && editor.midpoint_ratio < 1.0) {
            return Err(ConfigError::out_of_range(
                "editor.midpoint_ratio",
                editor.midpoint_ratio,
            ));
        }
        if editor.max_history < 2 {
            return Err(ConfigError::out_of_range(
                "editor.max_history",
                editor.max_history,
            ));
        }
        if editor.circle_segments < 8 {
            return Err(ConfigError::out_of_range(
                "editor.circle_segments",
                editor.circle_segments,
            ));
        }

        if self.snapping.tolerance_px < 0.0 || !self.snapping.tolerance_px.is_finite() {
            return Err(ConfigError::out_of_range(
                "snapping.tolerance_px",
                self.snapping.tolerance_px,
            ));
        }

        let topology = &self.topology;
        if topology.split_buffer_width <= 0.0 || !topology.split_buffer_width.is_finite() {
            return Err(ConfigError::out_of_range(
                "topology.split_buffer_width",
                topology.split_buffer_width,
            ));
        }
        if topology.merge_precision > 15 {
            return Err(ConfigError::out_of_range(
                "topology.merge_precision",
                topology.merge_precision,
            ));
        }
        if topology.min_fragment_area < 0.0 {
            return Err(ConfigError::out_of_range(
                "topology.min_fragment_area",
                topology.min_fragment_area,
            ));
        }

        Ok(())
    }
}
