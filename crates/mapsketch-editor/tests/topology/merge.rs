use mapsketch_core::TopologyError;
use mapsketch_editor::{Bounds, Geometry};

use crate::{approx, p, setup, square};

#[test]
fn test_overlapping_area() {
    let a = Geometry::rectangle(Bounds::new(0.0, 0.0, 10.0, 10.0));
    let b = Geometry::rectangle(Bounds::new(5.0, 0.0, 15.0, 10.0));
    let (store, mut engine, ids) = setup(vec![a, b]);
    let mut result = None;
    engine.merge(&store, |o| result = Some(o)).expect("merge");
    let outcome = result.expect("callback");

    assert_eq!(outcome.removed, ids);
    assert_eq!(outcome.created.len(), 1);
    let merged = &outcome.created[0];
    assert!(matches!(merged, Geometry::Polygon(_)));
    // |A| + |B| - |A ∩ B|
    assert!(approx(merged.area(), 100.0 + 100.0 - 50.0, 1e-6));
    assert!(engine.selection().is_empty());
}

#[test]
fn test_disjoint_shapes_become_multipolygon() {
    let (store, mut engine, _) = setup(vec![square(0.0, 0.0, 10.0), square(20.0, 0.0, 10.0)]);
    let mut result = None;
    engine.merge(&store, |o| result = Some(o)).expect("merge");
    let merged = result.expect("callback").created.remove(0);

    assert!(matches!(&merged, Geometry::MultiPolygon(parts) if parts.len() == 2));
    assert!(approx(merged.area(), 200.0, 1e-6));
}

#[test]
fn test_three_way_merge() {
    let (store, mut engine, ids) = setup(vec![
        square(0.0, 0.0, 10.0),
        square(8.0, 0.0, 10.0),
        square(16.0, 0.0, 10.0),
    ]);
    let mut result = None;
    engine.merge(&store, |o| result = Some(o)).expect("merge");
    let outcome = result.expect("callback");
    assert_eq!(outcome.removed.len(), ids.len());
    assert!(approx(outcome.created[0].area(), 260.0, 1e-6));
}

#[test]
fn test_circle_and_square() {
    let circle = Geometry::Circle {
        center: p(100.0, 100.0),
        radius: 5.0,
    };
    let (store, mut engine, _) = setup(vec![square(0.0, 0.0, 10.0), circle]);
    let mut result = None;
    engine.merge(&store, |o| result = Some(o)).expect("merge");
    let merged = result.expect("callback").created.remove(0);
    assert_eq!(merged.parts().len(), 2);
}

#[test]
fn test_near_coincident_edges_are_joined() {
    let (store, mut engine, _) = setup(vec![
        square(0.0, 0.0, 10.0),
        Geometry::rectangle(Bounds::new(10.000_000_000_1, 0.0, 20.0, 10.0)),
    ]);
    let mut result = None;
    engine.merge(&store, |o| result = Some(o)).expect("merge");
    let merged = result.expect("callback").created.remove(0);
    assert!(approx(merged.area(), 200.0, 1e-6));
}

#[test]
fn test_needs_two_shapes() {
    let (store, mut engine, _) = setup(vec![square(0.0, 0.0, 10.0)]);
    let err = engine.merge(&store, |_| {}).unwrap_err();
    assert!(matches!(
        err,
        TopologyError::NotEnoughSelected { required: 2, selected: 1, .. }
    ));
}

#[test]
fn test_lines_cannot_be_merged() {
    let line = Geometry::LineString(vec![p(0.0, 0.0), p(5.0, 5.0)]);
    let (store, mut engine, ids) = setup(vec![square(0.0, 0.0, 10.0), line]);
    let mut called = false;
    let err = engine.merge(&store, |_| called = true).unwrap_err();
    assert_eq!(err, TopologyError::NotAreal { id: ids[1] });
    assert!(!called);
    assert_eq!(engine.selection().len(), 2);
}
