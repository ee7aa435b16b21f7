//! Geometry model.
//!
//! Plain coordinate values shared by the index, the snapping controller, the
//! editors and the topology engine. Rings are stored open; GeoJSON export
//! closes them.

mod bounds;
mod geometry;
mod point;
pub mod ring;
mod shape;

pub use bounds::Bounds;
pub use geometry::{circle_ring, EdgeRef, Geometry, GeometryKind, PolygonGeometry, VertexRef};
pub use point::{Point, ScreenPoint, Vector};
pub use shape::Shape;
