//! # MapSketch Editor
//!
//! Interactive geometry editing and topology for a 2-D map surface.
//!
//! ## Core Components
//!
//! - **Model**: points, rings, polygons and the [`Geometry`] union with
//!   GeoJSON export and import
//! - **Spatial index**: vertices and edges of reference shapes for snapping
//! - **Snapping**: vertex-then-edge snapping with a screen-space tolerance
//! - **Editors**: one [`ShapeEditor`] per shape, driven by pointer events
//! - **History**: bounded undo/redo of full-geometry snapshots
//! - **Activation**: at most one editor reacts to the pointer at a time
//! - **Topology**: clip-by-line, merge and reshape over a selection
//! - **Session**: host glue routing events and applying topology results
//!
//! ## Architecture
//!
//! ```text
//! Session
//!   ├── ActivationRegistry (single active editor)
//!   ├── ShapeEditor per shape
//!   │     ├── ShapeKind (per-kind rules)
//!   │     ├── SnapController ── GeometryIndex
//!   │     ├── History
//!   │     └── MapSurface (projection, cursor, interactions)
//!   ├── ShapeStore
//!   └── TopologyEngine (csgrs booleans)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mapsketch_editor::{ActivationRegistry, MapView, Point, ShapeEditor, ShapeKind, Viewport};
//! use mapsketch_core::shared;
//! use mapsketch_settings::Config;
//!
//! let registry = ActivationRegistry::new();
//! let surface = shared(MapView::new(Viewport::default()));
//! let editor = ShapeEditor::new(ShapeKind::Rectangle, &Config::default(), &registry, surface);
//! editor.begin(None)?;
//! editor.on_primary_click(Point::new(0.0, 0.0))?;
//! editor.on_primary_click(Point::new(10.0, 10.0))?;
//! println!("{}", editor.geojson().unwrap());
//! ```

pub mod activation;
pub mod editor;
pub mod history;
pub mod model;
pub mod session;
pub mod snapping;
pub mod spatial_index;
pub mod throttle;
pub mod topology;
pub mod viewport;

pub use activation::{Activatable, ActivationRegistry, EditorId};
pub use editor::{
    DragTarget, EditOutcome, EditorState, Handle, HandleKind, ListenerId, PointerEvent,
    ShapeEditor, ShapeKind,
};
pub use history::History;
pub use model::{
    circle_ring, Bounds, EdgeRef, Geometry, GeometryKind, Point, PolygonGeometry, ScreenPoint,
    Shape, Vector, VertexRef,
};
pub use session::{Session, SketchAction};
pub use snapping::{SnapController, SnapHit, SnapKind};
pub use spatial_index::{GeometryIndex, IndexedEdge, IndexedVertex};
pub use throttle::Throttle;
pub use topology::{
    Selection, ShapeId, ShapeLookup, ShapeStore, TopologyEngine, TopologyOutcome,
};
pub use viewport::{Cursor, MapSurface, MapView, Viewport};
