//! MapSketch Settings Crate
//!
//! Handles engine configuration: editor behaviour, snapping, topology
//! tolerances and shape styles. Settings load from and save to JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    Config, EditorSettings, ReshapeStrategy, ShapeStyle, SnapHighlight, SnapModes, SnapSettings,
    StyleSettings, TopologySettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
