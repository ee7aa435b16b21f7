//! Flat vertex/edge index over reference geometries.
//!
//! Built once from a set of source geometries and queried by the snapping
//! controller and by hit tests. The index is a read-only snapshot; it is
//! rebuilt whenever the source set changes.

use crate::model::{circle_ring, ring, Bounds, Geometry, Point};

/// A vertex and the index of the source geometry it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedVertex {
    pub point: Point,
    pub source: usize,
}

/// A segment and the index of the source geometry it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedEdge {
    pub start: Point,
    pub end: Point,
    pub source: usize,
}

impl IndexedEdge {
    pub fn bounds(&self) -> Bounds {
        Bounds::from_corners(self.start, self.end)
    }
}

/// Snapshot of every vertex and edge of the source geometries.
///
/// Iteration order is stable: sources in the order given, then parts, rings
/// and vertices in storage order.
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    vertices: Vec<IndexedVertex>,
    edges: Vec<IndexedEdge>,
    bounds: Option<Bounds>,
}

impl GeometryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index `sources`; circles are flattened to `circle_segments` edges and
    /// contribute their center as a vertex.
    pub fn build(sources: &[Geometry], circle_segments: u32) -> Self {
        let mut index = GeometryIndex::new();
        for (source, geometry) in sources.iter().enumerate() {
            index.add(source, geometry, circle_segments);
        }
        tracing::trace!(
            "Geometry index built: {} vertices, {} edges from {} sources",
            index.vertices.len(),
            index.edges.len(),
            sources.len()
        );
        index
    }

    fn add(&mut self, source: usize, geometry: &Geometry, circle_segments: u32) {
        match geometry {
            Geometry::Point(p) => self.push_vertex(source, *p),
            Geometry::LineString(points) => {
                for p in points {
                    self.push_vertex(source, *p);
                }
                for w in points.windows(2) {
                    self.push_edge(source, w[0], w[1]);
                }
            }
            Geometry::Circle { center, radius } => {
                self.push_vertex(source, *center);
                let outline = circle_ring(center, *radius, circle_segments);
                self.add_ring(source, &outline);
            }
            Geometry::Polygon(_) | Geometry::MultiPolygon(_) => {
                for part in geometry.parts() {
                    for r in &part.rings {
                        self.add_ring(source, r);
                    }
                }
            }
        }
    }

    fn add_ring(&mut self, source: usize, points: &[Point]) {
        for p in points {
            self.push_vertex(source, *p);
        }
        for (start, end) in ring::edges(points) {
            self.push_edge(source, start, end);
        }
    }

    fn push_vertex(&mut self, source: usize, point: Point) {
        match self.bounds.as_mut() {
            Some(b) => b.include(&point),
            None => self.bounds = Some(Bounds::new(point.x, point.y, point.x, point.y)),
        }
        self.vertices.push(IndexedVertex { point, source });
    }

    fn push_edge(&mut self, source: usize, start: Point, end: Point) {
        if start.approx_eq(&end) {
            return;
        }
        self.edges.push(IndexedEdge { start, end, source });
    }

    pub fn vertices(&self) -> &[IndexedVertex] {
        &self.vertices
    }

    pub fn edges(&self) -> &[IndexedEdge] {
        &self.edges
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertices inside `area`, in index order.
    pub fn vertices_in<'a>(
        &'a self,
        area: &'a Bounds,
    ) -> impl Iterator<Item = &'a IndexedVertex> + 'a {
        let reachable = self.bounds.is_some_and(|b| b.intersects(area));
        self.vertices
            .iter()
            .filter(move |v| reachable && area.contains_point(v.point.x, v.point.y))
    }

    /// Edges whose bounding boxes meet `area`, in index order.
    pub fn edges_in<'a>(
        &'a self,
        area: &'a Bounds,
    ) -> impl Iterator<Item = &'a IndexedEdge> + 'a {
        let reachable = self.bounds.is_some_and(|b| b.intersects(area));
        self.edges
            .iter()
            .filter(move |e| reachable && e.bounds().intersects(area))
    }
}
