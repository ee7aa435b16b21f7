//! # MapSketch
//!
//! Pointer-driven authoring of points, lines, circles, rectangles and
//! polygons on a 2-D map, with snapping, undo/redo and clip, merge and
//! reshape operations over a selection of areal shapes.
//!
//! The work is split across three library crates re-exported here:
//! `mapsketch-core` (errors, shared ownership, the interaction mode bus),
//! `mapsketch-settings` (configuration files) and `mapsketch-editor`
//! (geometry, editors, topology and [`Session`]). This crate adds logging
//! setup and the [`replay`] driver behind the `mapsketch` binary.

pub mod replay;

pub use mapsketch_core::{
    mode_manager, EditorError, Error, InteractionMode, ModeManager, Result, TopologyError,
};
pub use mapsketch_editor::{
    ActivationRegistry, Bounds, EditOutcome, EditorState, Geometry, MapSurface, MapView, Point,
    PointerEvent, PolygonGeometry, Session, ShapeEditor, ShapeKind, ShapeStore, SketchAction,
    TopologyEngine, TopologyOutcome, Viewport,
};
pub use mapsketch_settings::{Config, ReshapeStrategy};
pub use replay::{Script, Step, StepReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Log lines go to stderr so that GeoJSON written to stdout stays clean.
/// `RUST_LOG` overrides the default `info` level.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
