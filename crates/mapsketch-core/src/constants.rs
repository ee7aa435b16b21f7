//! Shared numeric constants.

/// Coordinates closer than this (world units) are treated as the same vertex.
pub const GEOMETRY_EPSILON: f64 = 1e-9;

/// Area below which a polygon fragment is considered degenerate.
pub const AREA_EPSILON: f64 = 1e-12;

/// Default canvas size used by headless map views (pixels).
pub const DEFAULT_VIEW_WIDTH: f64 = 1024.0;

/// Default canvas height used by headless map views (pixels).
pub const DEFAULT_VIEW_HEIGHT: f64 = 768.0;
