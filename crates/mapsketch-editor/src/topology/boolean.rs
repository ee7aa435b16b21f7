//! Conversions between model polygons and `csgrs` sketches, and the boolean
//! building blocks of the topology operations.

use std::panic::{self, AssertUnwindSafe};

use csgrs::sketch::Sketch;
use csgrs::traits::CSG;
use tracing::warn;

use mapsketch_core::constants::GEOMETRY_EPSILON;

use crate::model::{ring, Geometry, Point, PolygonGeometry};

/// Run a backend call, turning a panic into `None`.
pub(crate) fn guarded<T>(operation: &str, op: impl FnOnce() -> T) -> Option<T> {
    match panic::catch_unwind(AssertUnwindSafe(op)) {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Panic in boolean backend during {}", operation);
            None
        }
    }
}

fn ring_sketch(points: &[Point]) -> Sketch<()> {
    if points.len() < 3 {
        return Sketch::new();
    }
    let coords: Vec<[f64; 2]> = points.iter().map(|p| [p.x, p.y]).collect();
    Sketch::polygon(&coords, None)
}

pub(crate) fn polygon_sketch(polygon: &PolygonGeometry) -> Sketch<()> {
    let outer = ring_sketch(polygon.outer());
    polygon
        .holes()
        .iter()
        .fold(outer, |acc, hole| acc.difference(&ring_sketch(hole)))
}

pub(crate) fn polygons_sketch(polygons: &[PolygonGeometry]) -> Sketch<()> {
    let mut sketches = polygons.iter().map(polygon_sketch);
    match sketches.next() {
        Some(first) => sketches.fold(first, |acc, s| acc.union(&s)),
        None => Sketch::new(),
    }
}

/// Polygons of a sketch, rings normalized to open form.
pub(crate) fn sketch_polygons(sketch: &Sketch<()>) -> Vec<PolygonGeometry> {
    let mp = sketch.to_multipolygon();
    let mut polygons = Vec::with_capacity(mp.0.len());
    for poly in mp.0.iter() {
        let outer: Vec<Point> = poly
            .exterior()
            .0
            .iter()
            .map(|c| Point::new(c.x, c.y))
            .collect();
        let outer = ring::normalize(&outer);
        if outer.len() < 3 {
            continue;
        }
        let holes = poly
            .interiors()
            .iter()
            .map(|interior| {
                let hole: Vec<Point> = interior.0.iter().map(|c| Point::new(c.x, c.y)).collect();
                ring::normalize(&hole)
            })
            .filter(|hole| hole.len() >= 3)
            .collect();
        polygons.push(PolygonGeometry::with_holes(outer, holes));
    }
    polygons
}

/// Thin area around an open polyline: one quad per segment plus a square at
/// every vertex to fill the joints.
pub(crate) fn line_buffer(line: &[Point], width: f64) -> Sketch<()> {
    let half = width / 2.0;
    let mut pieces: Vec<Sketch<()>> = Vec::new();
    for w in line.windows(2) {
        let (a, b) = (w[0], w[1]);
        let d = b - a;
        let len = d.length();
        if len <= GEOMETRY_EPSILON {
            continue;
        }
        let (nx, ny) = (-d.dy / len * half, d.dx / len * half);
        let quad = [
            [a.x - nx, a.y - ny],
            [b.x - nx, b.y - ny],
            [b.x + nx, b.y + ny],
            [a.x + nx, a.y + ny],
        ];
        pieces.push(Sketch::polygon(&quad, None));
    }
    for p in line {
        let square = [
            [p.x - half, p.y - half],
            [p.x + half, p.y - half],
            [p.x + half, p.y + half],
            [p.x - half, p.y + half],
        ];
        pieces.push(Sketch::polygon(&square, None));
    }

    let mut pieces = pieces.into_iter();
    match pieces.next() {
        Some(first) => pieces.fold(first, |acc, s| acc.union(&s)),
        None => Sketch::new(),
    }
}

/// Polygon minus the buffer, fragments below `min_area` dropped.
pub(crate) fn split_polygon(
    polygon: &PolygonGeometry,
    buffer: &Sketch<()>,
    min_area: f64,
) -> Vec<PolygonGeometry> {
    let cut = polygon_sketch(polygon).difference(buffer);
    sketch_polygons(&cut)
        .into_iter()
        .filter(|p| p.area() >= min_area)
        .collect()
}

/// Copy of the polygon with every coordinate rounded to `decimals`.
pub(crate) fn rounded_polygon(polygon: &PolygonGeometry, decimals: u32) -> PolygonGeometry {
    PolygonGeometry {
        rings: polygon
            .rings
            .iter()
            .map(|r| ring::normalize(&r.iter().map(|p| p.rounded(decimals)).collect::<Vec<_>>()))
            .collect(),
    }
}

/// One polygon becomes a Polygon, several a MultiPolygon.
pub(crate) fn assemble(mut polygons: Vec<PolygonGeometry>) -> Option<Geometry> {
    match polygons.len() {
        0 => None,
        1 => polygons.pop().map(Geometry::Polygon),
        _ => Some(Geometry::MultiPolygon(polygons)),
    }
}
