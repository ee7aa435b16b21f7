//! Geometry values handled by the editors and the topology engine.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::f64::consts::PI;
use std::fmt;

use mapsketch_core::EditorError;

use super::ring;
use super::{Bounds, Point, Vector};

/// Address of a vertex: polygon part, ring within the part, index in the ring.
///
/// Lines use part 0 and ring 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexRef {
    pub part: usize,
    pub ring: usize,
    pub index: usize,
}

impl VertexRef {
    pub fn new(part: usize, ring: usize, index: usize) -> Self {
        Self { part, ring, index }
    }
}

/// Address of an edge; `index` is the edge's starting vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeRef {
    pub part: usize,
    pub ring: usize,
    pub index: usize,
}

impl EdgeRef {
    pub fn new(part: usize, ring: usize, index: usize) -> Self {
        Self { part, ring, index }
    }

    pub fn start(&self) -> VertexRef {
        VertexRef::new(self.part, self.ring, self.index)
    }
}

/// A polygon: the first ring is the outer boundary, the rest are holes.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolygonGeometry {
    pub rings: Vec<Vec<Point>>,
}

impl PolygonGeometry {
    pub fn new(outer: Vec<Point>) -> Self {
        Self { rings: vec![outer] }
    }

    pub fn with_holes(outer: Vec<Point>, holes: Vec<Vec<Point>>) -> Self {
        let mut rings = Vec::with_capacity(holes.len() + 1);
        rings.push(outer);
        rings.extend(holes);
        Self { rings }
    }

    pub fn outer(&self) -> &[Point] {
        self.rings.first().map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn holes(&self) -> &[Vec<Point>] {
        if self.rings.is_empty() {
            &[]
        } else {
            &self.rings[1..]
        }
    }

    pub fn area(&self) -> f64 {
        let holes: f64 = self.holes().iter().map(|h| ring::area(h)).sum();
        (ring::area(self.outer()) - holes).max(0.0)
    }

    /// Total boundary length, holes included.
    pub fn perimeter(&self) -> f64 {
        self.rings.iter().map(|r| ring::perimeter(r)).sum()
    }

    pub fn contains(&self, p: &Point) -> bool {
        ring::contains(self.outer(), p) && !self.holes().iter().any(|h| ring::contains(h, p))
    }

    fn geojson_rings(&self) -> Vec<Vec<[f64; 2]>> {
        self.rings.iter().map(|r| closed_coords(r)).collect()
    }
}

/// Discriminant of [`Geometry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometryKind {
    Point,
    LineString,
    Circle,
    Polygon,
    MultiPolygon,
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Point => write!(f, "Point"),
            Self::LineString => write!(f, "LineString"),
            Self::Circle => write!(f, "Circle"),
            Self::Polygon => write!(f, "Polygon"),
            Self::MultiPolygon => write!(f, "MultiPolygon"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Geometry {
    Point(Point),
    LineString(Vec<Point>),
    Circle { center: Point, radius: f64 },
    Polygon(PolygonGeometry),
    MultiPolygon(Vec<PolygonGeometry>),
}

impl Geometry {
    /// Polygon with a single outer ring.
    pub fn polygon(outer: Vec<Point>) -> Self {
        Geometry::Polygon(PolygonGeometry::new(outer))
    }

    /// Axis-aligned rectangle ring `(min,min) (max,min) (max,max) (min,max)`.
    pub fn rectangle(bounds: Bounds) -> Self {
        Geometry::polygon(bounds.corners().to_vec())
    }

    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) => GeometryKind::LineString,
            Geometry::Circle { .. } => GeometryKind::Circle,
            Geometry::Polygon(_) => GeometryKind::Polygon,
            Geometry::MultiPolygon(_) => GeometryKind::MultiPolygon,
        }
    }

    /// Polygon or MultiPolygon or Circle
    pub fn is_areal(&self) -> bool {
        matches!(
            self,
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) | Geometry::Circle { .. }
        )
    }

    /// Polygon parts, borrowed. Circles and lines have none.
    pub fn parts(&self) -> &[PolygonGeometry] {
        match self {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(parts) => parts,
            _ => &[],
        }
    }

    /// Polygon parts with circles approximated by `segments` vertices.
    pub fn to_polygons(&self, segments: u32) -> Vec<PolygonGeometry> {
        match self {
            Geometry::Circle { center, radius } => {
                vec![PolygonGeometry::new(circle_ring(center, *radius, segments))]
            }
            other => other.parts().to_vec(),
        }
    }

    /// The vertex ring at `(part, ring)`; lines expose their points as ring 0.
    pub fn ring(&self, part: usize, ring: usize) -> Option<&Vec<Point>> {
        match self {
            Geometry::LineString(points) if part == 0 && ring == 0 => Some(points),
            Geometry::Polygon(p) if part == 0 => p.rings.get(ring),
            Geometry::MultiPolygon(parts) => parts.get(part).and_then(|p| p.rings.get(ring)),
            _ => None,
        }
    }

    pub fn ring_mut(&mut self, part: usize, ring: usize) -> Option<&mut Vec<Point>> {
        match self {
            Geometry::LineString(points) if part == 0 && ring == 0 => Some(points),
            Geometry::Polygon(p) if part == 0 => p.rings.get_mut(ring),
            Geometry::MultiPolygon(parts) => {
                parts.get_mut(part).and_then(|p| p.rings.get_mut(ring))
            }
            _ => None,
        }
    }

    /// Every vertex ring with its address and whether it closes on itself.
    pub fn rings(&self) -> Vec<(usize, usize, &[Point], bool)> {
        match self {
            Geometry::LineString(points) => vec![(0, 0, points.as_slice(), false)],
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => self
                .parts()
                .iter()
                .enumerate()
                .flat_map(|(pi, part)| {
                    part.rings
                        .iter()
                        .enumerate()
                        .map(move |(ri, r)| (pi, ri, r.as_slice(), true))
                })
                .collect(),
            Geometry::Point(_) | Geometry::Circle { .. } => Vec::new(),
        }
    }

    pub fn vertex(&self, at: VertexRef) -> Option<Point> {
        self.ring(at.part, at.ring)
            .and_then(|r| r.get(at.index))
            .copied()
    }

    /// Every coordinate; a circle contributes its center.
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Geometry::Point(p) => vec![*p],
            Geometry::Circle { center, .. } => vec![*center],
            _ => self
                .rings()
                .into_iter()
                .flat_map(|(_, _, r, _)| r.iter().copied())
                .collect(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) | Geometry::Circle { .. } => 1,
            _ => self.rings().iter().map(|(_, _, r, _)| r.len()).sum(),
        }
    }

    pub fn translate(&mut self, offset: Vector) {
        match self {
            Geometry::Point(p) => *p = p.translated(offset),
            Geometry::LineString(points) => {
                for p in points.iter_mut() {
                    *p = p.translated(offset);
                }
            }
            Geometry::Circle { center, .. } => *center = center.translated(offset),
            Geometry::Polygon(poly) => translate_polygon(poly, offset),
            Geometry::MultiPolygon(parts) => {
                for poly in parts.iter_mut() {
                    translate_polygon(poly, offset);
                }
            }
        }
    }

    pub fn translated(&self, offset: Vector) -> Geometry {
        let mut out = self.clone();
        out.translate(offset);
        out
    }

    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Geometry::Circle { center, radius } => Some(Bounds::new(
                center.x - radius,
                center.y - radius,
                center.x + radius,
                center.y + radius,
            )),
            _ => Bounds::from_points(self.vertices().iter()),
        }
    }

    pub fn area(&self) -> f64 {
        match self {
            Geometry::Circle { radius, .. } => PI * radius * radius,
            Geometry::Point(_) | Geometry::LineString(_) => 0.0,
            _ => self.parts().iter().map(PolygonGeometry::area).sum(),
        }
    }

    pub fn perimeter(&self) -> f64 {
        match self {
            Geometry::Point(_) => 0.0,
            Geometry::LineString(points) => ring::path_length(points),
            Geometry::Circle { radius, .. } => 2.0 * PI * radius,
            _ => self.parts().iter().map(PolygonGeometry::perimeter).sum(),
        }
    }

    /// Interior containment for areal geometries; lines and points never
    /// contain anything.
    pub fn contains(&self, p: &Point) -> bool {
        match self {
            Geometry::Circle { center, radius } => center.distance_to(p) <= *radius,
            Geometry::Point(_) | Geometry::LineString(_) => false,
            _ => self.parts().iter().any(|part| part.contains(p)),
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Geometry::Circle { center, radius } => center.is_finite() && radius.is_finite(),
            _ => self.vertices().iter().all(Point::is_finite),
        }
    }

    /// Export as a GeoJSON geometry object. Circles become polygons with
    /// `circle_segments` vertices.
    pub fn geojson(&self, circle_segments: u32) -> Value {
        match self {
            Geometry::Point(p) => json!({ "type": "Point", "coordinates": [p.x, p.y] }),
            Geometry::LineString(points) => json!({
                "type": "LineString",
                "coordinates": points.iter().map(|p| [p.x, p.y]).collect::<Vec<_>>(),
            }),
            Geometry::Circle { center, radius } => {
                let ring = circle_ring(center, *radius, circle_segments);
                json!({ "type": "Polygon", "coordinates": [closed_coords(&ring)] })
            }
            Geometry::Polygon(poly) => {
                json!({ "type": "Polygon", "coordinates": poly.geojson_rings() })
            }
            Geometry::MultiPolygon(parts) => json!({
                "type": "MultiPolygon",
                "coordinates": parts.iter().map(PolygonGeometry::geojson_rings).collect::<Vec<_>>(),
            }),
        }
    }

    /// Parse a GeoJSON `Point`, `LineString`, `Polygon` or `MultiPolygon`.
    ///
    /// Closing vertices of polygon rings are dropped.
    pub fn from_geojson(value: &Value) -> Result<Geometry, EditorError> {
        let kind = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| EditorError::invalid_geometry("GeoJSON object has no type"))?;
        let coords = value
            .get("coordinates")
            .ok_or_else(|| EditorError::invalid_geometry("GeoJSON object has no coordinates"))?;

        match kind {
            "Point" => Ok(Geometry::Point(parse_position(coords)?)),
            "LineString" => Ok(Geometry::LineString(parse_positions(coords)?)),
            "Polygon" => Ok(Geometry::Polygon(parse_polygon(coords)?)),
            "MultiPolygon" => {
                let parts = coords
                    .as_array()
                    .ok_or_else(|| EditorError::invalid_geometry("MultiPolygon must be an array"))?
                    .iter()
                    .map(parse_polygon)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Geometry::MultiPolygon(parts))
            }
            other => Err(EditorError::invalid_geometry(format!(
                "unsupported GeoJSON type '{}'",
                other
            ))),
        }
    }
}

fn translate_polygon(poly: &mut PolygonGeometry, offset: Vector) {
    for r in poly.rings.iter_mut() {
        for p in r.iter_mut() {
            *p = p.translated(offset);
        }
    }
}

fn closed_coords(ring: &[Point]) -> Vec<[f64; 2]> {
    let mut coords: Vec<[f64; 2]> = ring.iter().map(|p| [p.x, p.y]).collect();
    if let Some(first) = ring.first() {
        coords.push([first.x, first.y]);
    }
    coords
}

/// Counter-clockwise ring approximating a circle.
pub fn circle_ring(center: &Point, radius: f64, segments: u32) -> Vec<Point> {
    let segments = segments.max(3);
    (0..segments)
        .map(|i| {
            let theta = 2.0 * PI * (i as f64) / (segments as f64);
            Point::new(
                center.x + radius * theta.cos(),
                center.y + radius * theta.sin(),
            )
        })
        .collect()
}

fn parse_position(value: &Value) -> Result<Point, EditorError> {
    let pair = value
        .as_array()
        .filter(|a| a.len() >= 2)
        .ok_or_else(|| EditorError::invalid_geometry("position must be [x, y]"))?;
    match (pair[0].as_f64(), pair[1].as_f64()) {
        (Some(x), Some(y)) => Ok(Point::new(x, y)),
        _ => Err(EditorError::invalid_geometry("position must be numeric")),
    }
}

fn parse_positions(value: &Value) -> Result<Vec<Point>, EditorError> {
    value
        .as_array()
        .ok_or_else(|| EditorError::invalid_geometry("coordinates must be an array"))?
        .iter()
        .map(parse_position)
        .collect()
}

fn parse_polygon(value: &Value) -> Result<PolygonGeometry, EditorError> {
    let rings = value
        .as_array()
        .ok_or_else(|| EditorError::invalid_geometry("polygon must be an array of rings"))?
        .iter()
        .map(|r| parse_positions(r).map(|pts| ring::normalize(&pts)))
        .collect::<Result<Vec<_>, _>>()?;
    if rings.first().is_none_or(|outer| outer.len() < 3) {
        return Err(EditorError::invalid_geometry(
            "polygon outer ring needs at least 3 vertices",
        ));
    }
    Ok(PolygonGeometry { rings })
}
