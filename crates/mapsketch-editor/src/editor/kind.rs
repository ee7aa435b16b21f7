//! Per-kind rules: how many clicks complete a shape, how vertices rebuild
//! the geometry, what counts as valid, which edits are allowed.

use serde::{Deserialize, Serialize};
use std::fmt;

use mapsketch_core::constants::GEOMETRY_EPSILON;
use mapsketch_core::{EditorError, EditorResult};

use crate::model::{ring, Bounds, EdgeRef, Geometry, Point, Vector, VertexRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Point,
    Line,
    Circle,
    Rectangle,
    Polygon,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl ShapeKind {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Point => "Point",
            ShapeKind::Line => "Line",
            ShapeKind::Circle => "Circle",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Polygon => "Polygon",
        }
    }

    /// Editor kind for an existing geometry. Axis-aligned four-vertex
    /// polygons are edited as rectangles.
    pub fn for_geometry(geometry: &Geometry) -> ShapeKind {
        match geometry {
            Geometry::Point(_) => ShapeKind::Point,
            Geometry::LineString(_) => ShapeKind::Line,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Polygon(_) if rectangle_bounds(geometry).is_some() => ShapeKind::Rectangle,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => ShapeKind::Polygon,
        }
    }

    /// Clicks that complete a drawing; `None` for shapes finished by a
    /// secondary activation.
    pub fn clicks_to_complete(&self) -> Option<usize> {
        match self {
            ShapeKind::Point => Some(1),
            ShapeKind::Circle | ShapeKind::Rectangle => Some(2),
            ShapeKind::Line | ShapeKind::Polygon => None,
        }
    }

    /// Distinct vertices needed to finish a drawing.
    pub fn min_vertices(&self) -> usize {
        match self {
            ShapeKind::Point => 1,
            ShapeKind::Line | ShapeKind::Circle | ShapeKind::Rectangle => 2,
            ShapeKind::Polygon => 3,
        }
    }

    pub fn is_editable(&self) -> bool {
        !matches!(self, ShapeKind::Point)
    }

    pub fn has_vertex_handles(&self) -> bool {
        matches!(
            self,
            ShapeKind::Line | ShapeKind::Rectangle | ShapeKind::Polygon
        )
    }

    /// Midpoint handles; rectangles use them to drag a side.
    pub fn has_midpoint_handles(&self) -> bool {
        self.has_vertex_handles()
    }

    /// Whether clicking a midpoint inserts a vertex.
    pub fn supports_insertion(&self) -> bool {
        matches!(self, ShapeKind::Line | ShapeKind::Polygon)
    }

    /// Smallest ring size left by a removal; `None` when removal is not
    /// supported at all.
    pub fn vertex_floor(&self) -> Option<usize> {
        match self {
            ShapeKind::Line => Some(2),
            ShapeKind::Polygon => Some(3),
            ShapeKind::Point | ShapeKind::Circle | ShapeKind::Rectangle => None,
        }
    }

    /// Whether an existing geometry can be handed to an editor of this kind.
    pub fn accepts(&self, geometry: &Geometry) -> bool {
        match (self, geometry) {
            (ShapeKind::Point, Geometry::Point(_)) => true,
            (ShapeKind::Line, Geometry::LineString(points)) => points.len() >= 2,
            (ShapeKind::Circle, Geometry::Circle { radius, .. }) => *radius > 0.0,
            (ShapeKind::Rectangle, Geometry::Polygon(_)) => rectangle_bounds(geometry).is_some(),
            (ShapeKind::Polygon, Geometry::Polygon(_) | Geometry::MultiPolygon(_)) => geometry
                .rings()
                .iter()
                .all(|(_, _, r, _)| r.len() >= 3),
            _ => false,
        }
    }

    /// Canonical form for editing: rectangles get the ring order
    /// `(min,min) (max,min) (max,max) (min,max)`.
    pub fn normalize(&self, geometry: Geometry) -> Geometry {
        match self {
            ShapeKind::Rectangle => match rectangle_bounds(&geometry) {
                Some(bounds) => Geometry::rectangle(bounds),
                None => geometry,
            },
            _ => geometry,
        }
    }

    /// In-progress geometry from committed vertices plus the live cursor.
    pub fn preview(&self, draft: &[Point], cursor: Option<Point>) -> Option<Geometry> {
        let mut points = draft.to_vec();
        points.extend(cursor);
        match self {
            ShapeKind::Point => points.first().map(|p| Geometry::Point(*p)),
            ShapeKind::Line => {
                if points.is_empty() {
                    None
                } else {
                    Some(Geometry::LineString(points))
                }
            }
            ShapeKind::Polygon => match points.len() {
                0 => None,
                1 | 2 => Some(Geometry::LineString(points)),
                _ => Some(Geometry::polygon(points)),
            },
            ShapeKind::Circle => points.first().map(|center| Geometry::Circle {
                center: *center,
                radius: points.get(1).map_or(0.0, |edge| center.distance_to(edge)),
            }),
            ShapeKind::Rectangle => match points.as_slice() {
                [] => None,
                [a] => Some(Geometry::rectangle(Bounds::from_corners(*a, *a))),
                [a, b, ..] => Some(Geometry::rectangle(Bounds::from_corners(*a, *b))),
            },
        }
    }

    /// Final geometry from the drawn vertices, or why it cannot be made.
    pub fn build(&self, points: &[Point], allow_self_intersect: bool) -> EditorResult<Geometry> {
        match self {
            ShapeKind::Point => points
                .first()
                .map(|p| Geometry::Point(*p))
                .ok_or_else(|| EditorError::invalid_geometry("point needs a position")),
            ShapeKind::Circle => match points {
                [center, edge, ..] => {
                    let radius = center.distance_to(edge);
                    if radius <= GEOMETRY_EPSILON {
                        Err(EditorError::invalid_geometry("circle radius must be non-zero"))
                    } else {
                        Ok(Geometry::Circle {
                            center: *center,
                            radius,
                        })
                    }
                }
                _ => Err(EditorError::invalid_geometry("circle needs a center and a radius point")),
            },
            ShapeKind::Rectangle => match points {
                [a, b, ..] => {
                    let bounds = Bounds::from_corners(*a, *b);
                    if bounds.width() <= GEOMETRY_EPSILON || bounds.height() <= GEOMETRY_EPSILON {
                        Err(EditorError::invalid_geometry(
                            "rectangle corners must differ in both directions",
                        ))
                    } else {
                        Ok(Geometry::rectangle(bounds))
                    }
                }
                _ => Err(EditorError::invalid_geometry("rectangle needs two corners")),
            },
            ShapeKind::Line => {
                let points = ring::normalize_open(points);
                if ring::distinct_count(&points) < 2 {
                    return Err(EditorError::invalid_geometry(
                        "line needs at least 2 distinct vertices",
                    ));
                }
                Ok(Geometry::LineString(points))
            }
            ShapeKind::Polygon => {
                let points = ring::normalize(points);
                if ring::distinct_count(&points) < 3 {
                    return Err(EditorError::invalid_geometry(
                        "polygon needs at least 3 distinct vertices",
                    ));
                }
                if !allow_self_intersect && ring::self_intersects(&points) {
                    return Err(EditorError::invalid_geometry("polygon ring self-intersects"));
                }
                Ok(Geometry::polygon(points))
            }
        }
    }

    /// Validity used for styling: zero-size shapes and, when validation is
    /// on, self-intersecting rings are invalid.
    pub fn is_valid(&self, geometry: &Geometry, allow_self_intersect: bool) -> bool {
        match geometry {
            Geometry::Circle { radius, .. } => *radius > GEOMETRY_EPSILON,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => geometry.rings().iter().all(|(_, _, r, _)| {
                r.len() >= 3 && (allow_self_intersect || !ring::self_intersects(r))
            }) && (!matches!(self, ShapeKind::Rectangle) || geometry.area() > GEOMETRY_EPSILON),
            Geometry::LineString(points) => ring::distinct_count(points) >= 1,
            Geometry::Point(p) => p.is_finite(),
        }
    }

    /// Geometry after moving one vertex of `start` to `target`.
    pub fn drag_vertex(&self, start: &Geometry, at: VertexRef, target: Point) -> Option<Geometry> {
        match self {
            ShapeKind::Line | ShapeKind::Polygon => {
                let mut out = start.clone();
                let slot = out.ring_mut(at.part, at.ring)?.get_mut(at.index)?;
                *slot = target;
                Some(out)
            }
            ShapeKind::Rectangle => {
                let ring = start.ring(0, 0)?;
                if ring.len() != 4 || at.index >= 4 {
                    return None;
                }
                let opposite = ring[(at.index + 2) % 4];
                Some(Geometry::rectangle(Bounds::from_corners(opposite, target)))
            }
            ShapeKind::Point | ShapeKind::Circle => None,
        }
    }

    /// Axis along which a rectangle side moves: `(dx, dy)` multipliers.
    pub fn edge_axis(&self, edge: EdgeRef) -> Option<(f64, f64)> {
        match (self, edge.index) {
            (ShapeKind::Rectangle, 0 | 2) => Some((0.0, 1.0)),
            (ShapeKind::Rectangle, 1 | 3) => Some((1.0, 0.0)),
            _ => None,
        }
    }

    /// Geometry after moving one rectangle side by `delta` along its normal.
    pub fn drag_edge(&self, start: &Geometry, edge: EdgeRef, delta: Vector) -> Option<Geometry> {
        if !matches!(self, ShapeKind::Rectangle) {
            return None;
        }
        let b = rectangle_bounds(start)?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (b.min_x, b.min_y, b.max_x, b.max_y);
        match edge.index {
            0 => min_y += delta.dy,
            1 => max_x += delta.dx,
            2 => max_y += delta.dy,
            3 => min_x += delta.dx,
            _ => return None,
        }
        Some(Geometry::rectangle(Bounds::new(min_x, min_y, max_x, max_y)))
    }
}

/// Bounds of a single-ring, four-vertex, axis-aligned polygon.
fn rectangle_bounds(geometry: &Geometry) -> Option<Bounds> {
    let Geometry::Polygon(poly) = geometry else {
        return None;
    };
    if poly.rings.len() != 1 || poly.outer().len() != 4 {
        return None;
    }
    let ring = poly.outer();
    let bounds = Bounds::from_points(ring.iter())?;
    let on_corner = |p: &Point| {
        ((p.x - bounds.min_x).abs() <= GEOMETRY_EPSILON || (p.x - bounds.max_x).abs() <= GEOMETRY_EPSILON)
            && ((p.y - bounds.min_y).abs() <= GEOMETRY_EPSILON
                || (p.y - bounds.max_y).abs() <= GEOMETRY_EPSILON)
    };
    let axis_aligned = ring.iter().all(on_corner)
        && ring::edges(ring).all(|(a, b)| {
            (a.x - b.x).abs() <= GEOMETRY_EPSILON || (a.y - b.y).abs() <= GEOMETRY_EPSILON
        });
    if axis_aligned && bounds.width() > GEOMETRY_EPSILON && bounds.height() > GEOMETRY_EPSILON {
        Some(bounds)
    } else {
        None
    }
}
