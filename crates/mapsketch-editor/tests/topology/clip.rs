use mapsketch_core::TopologyError;
use mapsketch_editor::{Geometry, TopologyOutcome};

use crate::{approx, areas, p, setup, square, square_with_hole};

#[test]
fn test_square_splits_in_two() {
    let (store, mut engine, ids) = setup(vec![square(0.0, 0.0, 100.0)]);
    let mut result = None;
    engine
        .clip_by_line(&store, &[p(50.0, -50.0), p(50.0, 150.0)], |o| result = Some(o))
        .expect("clip");
    let outcome = result.expect("callback");

    assert_eq!(outcome.removed, ids);
    assert_eq!(outcome.created.len(), 2);
    let areas = areas(&outcome);
    assert!(approx(areas[0], 5000.0, 1e-3));
    assert!(approx(areas[1], 5000.0, 1e-3));
    assert!(approx(areas.iter().sum::<f64>(), 10000.0, 1e-3));
    assert!(!engine.selection().contains(ids[0]));
}

#[test]
fn test_missing_line_changes_nothing() {
    let (store, mut engine, ids) = setup(vec![square(0.0, 0.0, 100.0)]);
    let mut result = None;
    engine
        .clip_by_line(&store, &[p(200.0, -50.0), p(200.0, 150.0)], |o| result = Some(o))
        .expect("clip");
    assert_eq!(result, Some(TopologyOutcome::default()));
    assert!(engine.selection().contains(ids[0]));
}

#[test]
fn test_hole_goes_with_its_fragment() {
    let (store, mut engine, _) = setup(vec![Geometry::Polygon(square_with_hole(100.0, 40.0, 20.0))]);
    let mut result = None;
    engine
        .clip_by_line(&store, &[p(20.0, -50.0), p(20.0, 150.0)], |o| result = Some(o))
        .expect("clip");
    let outcome = result.expect("callback");

    assert_eq!(outcome.created.len(), 2);
    let with_hole = outcome
        .created
        .iter()
        .filter(|g| g.parts().iter().any(|part| !part.holes().is_empty()))
        .count();
    assert_eq!(with_hole, 1);
    assert!(approx(areas(&outcome).iter().sum::<f64>(), 9600.0, 1e-3));
}

#[test]
fn test_multipolygon_parts_lose_holes() {
    let parts = vec![
        square_with_hole(100.0, 40.0, 20.0),
        match square(200.0, 0.0, 100.0) {
            Geometry::Polygon(poly) => poly,
            _ => unreachable!(),
        },
    ];
    let (store, mut engine, _) = setup(vec![Geometry::MultiPolygon(parts)]);
    let mut result = None;
    engine
        .clip_by_line(&store, &[p(-50.0, 50.0), p(350.0, 50.0)], |o| result = Some(o))
        .expect("clip");
    let outcome = result.expect("callback");

    assert_eq!(outcome.created.len(), 4);
    assert!(outcome
        .created
        .iter()
        .all(|g| g.parts().iter().all(|part| part.holes().is_empty())));
}

#[test]
fn test_lines_in_selection_are_skipped() {
    let line = Geometry::LineString(vec![p(0.0, 200.0), p(100.0, 200.0)]);
    let (store, mut engine, ids) = setup(vec![line, square(0.0, 0.0, 100.0)]);
    let mut result = None;
    engine
        .clip_by_line(&store, &[p(50.0, -50.0), p(50.0, 250.0)], |o| result = Some(o))
        .expect("clip");
    let outcome = result.expect("callback");
    assert_eq!(outcome.removed, vec![ids[1]]);
    assert_eq!(outcome.created.len(), 2);
    assert!(engine.selection().contains(ids[0]));
}

#[test]
fn test_circle_is_clipped_as_polygon() {
    let circle = Geometry::Circle {
        center: p(0.0, 0.0),
        radius: 50.0,
    };
    let (store, mut engine, _) = setup(vec![circle]);
    let mut result = None;
    engine
        .clip_by_line(&store, &[p(0.0, -100.0), p(0.0, 100.0)], |o| result = Some(o))
        .expect("clip");
    let outcome = result.expect("callback");
    assert_eq!(outcome.created.len(), 2);
    assert!(outcome
        .created
        .iter()
        .all(|g| matches!(g, Geometry::Polygon(_))));
}

#[test]
fn test_empty_selection() {
    let (store, mut engine, _) = setup(vec![]);
    let err = engine
        .clip_by_line(&store, &[p(0.0, 0.0), p(1.0, 0.0)], |_| {})
        .unwrap_err();
    assert_eq!(
        err,
        TopologyError::NotEnoughSelected {
            operation: "Clip".to_string(),
            required: 1,
            selected: 0
        }
    );
}
