//! Snapping of new and dragged vertices to reference geometry.
//!
//! Distances are measured in screen pixels through the [`MapSurface`], so the
//! tolerance feels the same at every zoom level. Snapping is advisory: a
//! point with nothing in range passes through unchanged.

use mapsketch_core::constants::GEOMETRY_EPSILON;
use mapsketch_settings::{SnapHighlight, SnapSettings};

use crate::model::{ring, Bounds, Geometry, Point, ScreenPoint, Vector};
use crate::spatial_index::GeometryIndex;
use crate::viewport::MapSurface;

/// What a point snapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapKind {
    Vertex,
    Edge,
}

/// A successful snap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SnapHit {
    /// Corrected world position
    pub point: Point,
    pub kind: SnapKind,
    /// Index of the source geometry in the order given to `set_sources`
    pub source: usize,
    /// Screen distance between the input and the corrected point
    pub distance_px: f64,
}

/// Finds the nearest reference vertex or edge within a pixel tolerance.
#[derive(Debug, Clone)]
pub struct SnapController {
    settings: SnapSettings,
    circle_segments: u32,
    index: GeometryIndex,
    last_hit: Option<SnapHit>,
}

impl SnapController {
    pub fn new(settings: SnapSettings, circle_segments: u32) -> Self {
        Self {
            settings,
            circle_segments,
            index: GeometryIndex::new(),
            last_hit: None,
        }
    }

    pub fn settings(&self) -> &SnapSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SnapSettings) {
        self.settings = settings;
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.settings.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    /// Rebuild the index from a new reference set.
    pub fn set_sources(&mut self, sources: &[Geometry]) {
        self.index = GeometryIndex::build(sources, self.circle_segments);
        self.last_hit = None;
        tracing::debug!(
            "Snap sources rebuilt: {} vertices, {} edges",
            self.index.vertices().len(),
            self.index.edges().len()
        );
    }

    pub fn clear_sources(&mut self) {
        self.index = GeometryIndex::new();
        self.last_hit = None;
    }

    pub fn index(&self) -> &GeometryIndex {
        &self.index
    }

    /// Target of the most recent successful [`snap`](Self::snap) when the
    /// highlight policy is `target`.
    pub fn last_hit(&self) -> Option<SnapHit> {
        self.last_hit
    }

    /// World area that can hold a hit for `screen`: the tolerance square
    /// around it, unprojected corner by corner.
    fn search_area(&self, screen: ScreenPoint, surface: &dyn MapSurface) -> Option<Bounds> {
        let t = self.settings.tolerance_px;
        let corners = [(-t, -t), (t, -t), (t, t), (-t, t)]
            .map(|(dx, dy)| surface.unproject(ScreenPoint::new(screen.x + dx, screen.y + dy)));
        Bounds::from_points(corners.iter()).map(|b| b.expanded(GEOMETRY_EPSILON))
    }

    /// Nearest indexed vertex within tolerance, regardless of the enabled
    /// flag and modes. Ties keep the first vertex found.
    pub fn snap_vertex(&self, point: Point, surface: &dyn MapSurface) -> Option<SnapHit> {
        let tolerance = self.settings.tolerance_px;
        let screen = surface.project(point);
        let area = self.search_area(screen, surface)?;
        let mut best: Option<SnapHit> = None;

        for vertex in self.index.vertices_in(&area) {
            let distance = surface.project(vertex.point).distance_to(&screen);
            if distance > tolerance {
                continue;
            }
            if best.is_none_or(|b| distance < b.distance_px) {
                best = Some(SnapHit {
                    point: vertex.point,
                    kind: SnapKind::Vertex,
                    source: vertex.source,
                    distance_px: distance,
                });
            }
        }
        best
    }

    /// Nearest perpendicular projection onto an indexed edge within
    /// tolerance, regardless of the enabled flag and modes.
    ///
    /// The projection is computed in screen space and its parameter applied
    /// to the world segment.
    pub fn snap_edge(&self, point: Point, surface: &dyn MapSurface) -> Option<SnapHit> {
        let tolerance = self.settings.tolerance_px;
        let screen = surface.project(point);
        let p = Point::new(screen.x, screen.y);
        let area = self.search_area(screen, surface)?;
        let mut best: Option<SnapHit> = None;

        for edge in self.index.edges_in(&area) {
            let a = surface.project(edge.start);
            let b = surface.project(edge.end);
            let (closest, t) =
                ring::project_onto_segment(&p, &Point::new(a.x, a.y), &Point::new(b.x, b.y));
            let distance = closest.distance_to(&p);
            if distance > tolerance {
                continue;
            }
            if best.is_none_or(|h| distance < h.distance_px) {
                best = Some(SnapHit {
                    point: edge.start.lerp(&edge.end, t),
                    kind: SnapKind::Edge,
                    source: edge.source,
                    distance_px: distance,
                });
            }
        }
        best
    }

    fn find(&self, point: Point, surface: &dyn MapSurface) -> Option<SnapHit> {
        if !self.settings.enabled || self.index.is_empty() {
            return None;
        }
        let vertex = if self.settings.modes.vertex {
            self.snap_vertex(point, surface)
        } else {
            None
        };
        vertex.or_else(|| {
            if self.settings.modes.edge {
                self.snap_edge(point, surface)
            } else {
                None
            }
        })
    }

    fn record(&mut self, hit: Option<SnapHit>) {
        self.last_hit = match self.settings.highlight {
            SnapHighlight::Target => hit,
            SnapHighlight::None => None,
        };
    }

    /// Corrected position for `point`: vertex snap first, then edge snap,
    /// each only when enabled.
    pub fn snap(&mut self, point: Point, surface: &dyn MapSurface) -> Point {
        let hit = self.find(point, surface);
        self.record(hit);
        hit.map_or(point, |h| h.point)
    }

    /// Offset that snaps the closest of several dragged points, or `None`
    /// when none of them is in range.
    pub fn snap_translation(&mut self, points: &[Point], surface: &dyn MapSurface) -> Option<Vector> {
        let mut best: Option<(SnapHit, Vector)> = None;
        for p in points {
            if let Some(hit) = self.find(*p, surface) {
                if best.is_none_or(|(b, _)| hit.distance_px < b.distance_px) {
                    best = Some((hit, hit.point - *p));
                }
            }
        }
        self.record(best.map(|(hit, _)| hit));
        best.map(|(_, offset)| offset)
    }
}
