use mapsketch_editor::{Geometry, MapView, Point, SnapController, SnapKind};
use mapsketch_settings::{SnapHighlight, SnapSettings};
use proptest::prelude::*;

fn controller(sources: &[Geometry]) -> SnapController {
    let mut snap = SnapController::new(SnapSettings::default(), 64);
    snap.set_sources(sources);
    snap
}

proptest! {
    #[test]
    fn prop_vertex_tolerance_is_inclusive(x in -300i32..300, y in -300i32..300) {
        let target = Point::new(x as f64, y as f64);
        let snap = controller(&[Geometry::Point(target)]);
        let view = MapView::default();
        let tolerance = snap.settings().tolerance_px;

        let at_edge = Point::new(target.x + tolerance, target.y);
        let hit = snap.snap_vertex(at_edge, &view);
        prop_assert_eq!(hit.map(|h| h.point), Some(target));

        let beyond = Point::new(target.x + tolerance + 1e-3, target.y);
        prop_assert!(snap.snap_vertex(beyond, &view).is_none());
    }

    #[test]
    fn prop_edge_snap_lands_on_segment(t in 0.05f64..0.95, offset in -9.0f64..9.0) {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(200.0, 0.0);
        let snap = controller(&[Geometry::LineString(vec![a, b])]);
        let view = MapView::default();
        let query = Point::new(200.0 * t, offset);
        let hit = snap.snap_edge(query, &view);
        prop_assert!(hit.is_some());
        let hit = hit.unwrap();
        prop_assert!(hit.point.y.abs() < 1e-9);
        prop_assert!((hit.point.x - 200.0 * t).abs() < 1e-6);
    }
}

#[test]
fn test_vertex_takes_priority_over_edge() {
    let mut snap = controller(&[Geometry::LineString(vec![
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
    ])]);
    let view = MapView::default();
    let snapped = snap.snap(Point::new(4.0, 3.0), &view);
    assert_eq!(snapped, Point::new(0.0, 0.0));
    assert_eq!(snap.last_hit().map(|h| h.kind), Some(SnapKind::Vertex));

    let snapped = snap.snap(Point::new(50.0, 3.0), &view);
    assert_eq!(snapped, Point::new(50.0, 0.0));
    assert_eq!(snap.last_hit().map(|h| h.kind), Some(SnapKind::Edge));
}

#[test]
fn test_nothing_in_range_passes_through() {
    let mut snap = controller(&[Geometry::Point(Point::new(0.0, 0.0))]);
    let view = MapView::default();
    let p = Point::new(40.0, 40.0);
    assert_eq!(snap.snap(p, &view), p);
    assert!(snap.last_hit().is_none());
}

#[test]
fn test_highlight_none_records_nothing() {
    let mut settings = SnapSettings::default();
    settings.highlight = SnapHighlight::None;
    let mut snap = SnapController::new(settings, 64);
    snap.set_sources(&[Geometry::Point(Point::new(0.0, 0.0))]);
    let view = MapView::default();
    assert_eq!(snap.snap(Point::new(1.0, 1.0), &view), Point::new(0.0, 0.0));
    assert!(snap.last_hit().is_none());
}

#[test]
fn test_translation_snaps_closest_point() {
    let mut snap = controller(&[Geometry::Point(Point::new(100.0, 100.0))]);
    let view = MapView::default();
    let offset = snap
        .snap_translation(&[Point::new(0.0, 0.0), Point::new(97.0, 98.0)], &view)
        .expect("one point in range");
    assert!((offset.dx - 3.0).abs() < 1e-9);
    assert!((offset.dy - 2.0).abs() < 1e-9);
}
