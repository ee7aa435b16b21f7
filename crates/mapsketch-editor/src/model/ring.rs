//! Ring and segment utilities.
//!
//! Rings are stored open: the closing edge from the last vertex back to the
//! first is implied. Area, perimeter and containment go through
//! `cavalier_contours` polylines; segment tests are computed directly.

use cavalier_contours::core::math::Vector2;
use cavalier_contours::polyline::{PlineSource, PlineSourceMut, PlineVertex, Polyline};

use mapsketch_core::constants::GEOMETRY_EPSILON;

use super::Point;

/// Closed polyline through the ring's vertices.
pub fn to_polyline(ring: &[Point]) -> Polyline<f64> {
    let mut pline = Polyline::new();
    for p in ring {
        pline.add_vertex(PlineVertex::new(p.x, p.y, 0.0));
    }
    pline.set_is_closed(true);
    pline
}

/// Signed area, positive for counter-clockwise rings.
pub fn signed_area(ring: &[Point]) -> f64 {
    if ring.len() < 3 {
        return 0.0;
    }
    to_polyline(ring).area()
}

pub fn area(ring: &[Point]) -> f64 {
    signed_area(ring).abs()
}

/// Length of the closed ring including the implied closing edge.
pub fn perimeter(ring: &[Point]) -> f64 {
    if ring.len() < 2 {
        return 0.0;
    }
    to_polyline(ring).path_length()
}

/// Length of an open polyline.
pub fn path_length(points: &[Point]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

/// Non-zero winding containment test.
pub fn contains(ring: &[Point], p: &Point) -> bool {
    if ring.len() < 3 {
        return false;
    }
    to_polyline(ring).winding_number(Vector2::new(p.x, p.y)) != 0
}

/// Closest point to `p` on segment `a`-`b` and its parameter along the segment.
pub fn project_onto_segment(p: &Point, a: &Point, b: &Point) -> (Point, f64) {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let len_sq = dx * dx + dy * dy;
    if len_sq <= GEOMETRY_EPSILON * GEOMETRY_EPSILON {
        return (*a, 0.0);
    }
    let t = (((p.x - a.x) * dx + (p.y - a.y) * dy) / len_sq).clamp(0.0, 1.0);
    (a.lerp(b, t), t)
}

pub fn distance_to_segment(p: &Point, a: &Point, b: &Point) -> f64 {
    let (closest, _) = project_onto_segment(p, a, b);
    p.distance_to(&closest)
}

fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(a: &Point, b: &Point, p: &Point) -> bool {
    p.x >= a.x.min(b.x) - GEOMETRY_EPSILON
        && p.x <= a.x.max(b.x) + GEOMETRY_EPSILON
        && p.y >= a.y.min(b.y) - GEOMETRY_EPSILON
        && p.y <= a.y.max(b.y) + GEOMETRY_EPSILON
}

/// True when segments `a1`-`a2` and `b1`-`b2` touch or cross.
pub fn segments_intersect(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> bool {
    let d1 = orientation(b1, b2, a1);
    let d2 = orientation(b1, b2, a2);
    let d3 = orientation(a1, a2, b1);
    let d4 = orientation(a1, a2, b2);

    if ((d1 > GEOMETRY_EPSILON && d2 < -GEOMETRY_EPSILON)
        || (d1 < -GEOMETRY_EPSILON && d2 > GEOMETRY_EPSILON))
        && ((d3 > GEOMETRY_EPSILON && d4 < -GEOMETRY_EPSILON)
            || (d3 < -GEOMETRY_EPSILON && d4 > GEOMETRY_EPSILON))
    {
        return true;
    }

    (d1.abs() <= GEOMETRY_EPSILON && on_segment(b1, b2, a1))
        || (d2.abs() <= GEOMETRY_EPSILON && on_segment(b1, b2, a2))
        || (d3.abs() <= GEOMETRY_EPSILON && on_segment(a1, a2, b1))
        || (d4.abs() <= GEOMETRY_EPSILON && on_segment(a1, a2, b2))
}

/// Parameters `(t, u)` where the two segments' supporting lines meet, when
/// that point lies on both segments. Parallel segments yield `None`.
pub fn segment_intersection(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Option<(f64, f64)> {
    let r = *a2 - *a1;
    let s = *b2 - *b1;
    let denom = r.dx * s.dy - r.dy * s.dx;
    if denom.abs() <= GEOMETRY_EPSILON * GEOMETRY_EPSILON {
        return None;
    }
    let q = *b1 - *a1;
    let t = (q.dx * s.dy - q.dy * s.dx) / denom;
    let u = (q.dx * r.dy - q.dy * r.dx) / denom;
    let range = -GEOMETRY_EPSILON..=1.0 + GEOMETRY_EPSILON;
    if range.contains(&t) && range.contains(&u) {
        Some((t, u))
    } else {
        None
    }
}

/// Iterate the ring's edges, closing edge included.
pub fn edges(ring: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = ring.len();
    let count = if n < 2 { 0 } else { n };
    (0..count).map(move |i| (ring[i], ring[(i + 1) % n]))
}

/// True when two non-adjacent edges of the closed ring touch or cross.
pub fn self_intersects(ring: &[Point]) -> bool {
    let n = ring.len();
    if n < 4 {
        return false;
    }
    for i in 0..n {
        let (a1, a2) = (ring[i], ring[(i + 1) % n]);
        for j in (i + 1)..n {
            // edges sharing a vertex
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            let (b1, b2) = (ring[j], ring[(j + 1) % n]);
            if segments_intersect(&a1, &a2, &b1, &b2) {
                return true;
            }
        }
    }
    false
}

/// Number of points where an open polyline crosses the closed ring.
///
/// Ring edges are treated as half-open so a crossing exactly through a ring
/// vertex counts once.
pub fn crossings(ring: &[Point], line: &[Point]) -> usize {
    let mut count = 0;
    for (r1, r2) in edges(ring) {
        for w in line.windows(2) {
            if let Some((t, _)) = segment_intersection(&r1, &r2, &w[0], &w[1]) {
                if t < 1.0 - GEOMETRY_EPSILON {
                    count += 1;
                }
            }
        }
    }
    count
}

/// True when any segment of the open polyline touches the closed ring.
pub fn touches(ring: &[Point], line: &[Point]) -> bool {
    edges(ring).any(|(r1, r2)| {
        line.windows(2)
            .any(|w| segments_intersect(&r1, &r2, &w[0], &w[1]))
    })
}

/// Drop consecutive duplicates only; for open polylines.
pub fn normalize_open(points: &[Point]) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().is_some_and(|last| last.approx_eq(p)) {
            continue;
        }
        out.push(*p);
    }
    out
}

/// Drop consecutive duplicates and a trailing copy of the first vertex.
pub fn normalize(points: &[Point]) -> Vec<Point> {
    let mut out = normalize_open(points);
    if out.len() > 1 && out[0].approx_eq(&out[out.len() - 1]) {
        out.pop();
    }
    out
}

/// Number of pairwise-distinct vertices.
pub fn distinct_count(points: &[Point]) -> usize {
    let mut seen: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        if !seen.iter().any(|q| q.approx_eq(p)) {
            seen.push(*p);
        }
    }
    seen.len()
}
