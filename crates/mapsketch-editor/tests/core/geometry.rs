use mapsketch_editor::{Bounds, Geometry, Point, PolygonGeometry};
use serde_json::json;

#[test]
fn test_rectangle_exports_closed_ring() {
    let rect = Geometry::rectangle(Bounds::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 10.0)));
    let value = rect.geojson(64);
    assert_eq!(value["type"], "Polygon");
    let ring = value["coordinates"][0].as_array().expect("ring");
    assert_eq!(ring.len(), 5);
    assert_eq!(ring[0], ring[4]);
    assert_eq!(ring[0], json!([0.0, 0.0]));
    assert_eq!(ring[2], json!([10.0, 10.0]));
}

#[test]
fn test_circle_exports_polygon_approximation() {
    let circle = Geometry::Circle {
        center: Point::new(0.0, 0.0),
        radius: 5.0,
    };
    let value = circle.geojson(32);
    assert_eq!(value["type"], "Polygon");
    assert_eq!(value["coordinates"][0].as_array().map(Vec::len), Some(33));
}

#[test]
fn test_parse_polygon_with_hole() {
    let value = json!({
        "type": "Polygon",
        "coordinates": [
            [[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]],
            [[4.0, 4.0], [6.0, 4.0], [6.0, 6.0], [4.0, 6.0], [4.0, 4.0]]
        ]
    });
    let geometry = Geometry::from_geojson(&value).expect("valid polygon");
    let Geometry::Polygon(poly) = &geometry else {
        panic!("expected a polygon, got {:?}", geometry);
    };
    assert_eq!(poly.outer().len(), 4);
    assert_eq!(poly.holes().len(), 1);
    assert!((geometry.area() - 96.0).abs() < 1e-9);
    assert!(!geometry.contains(&Point::new(5.0, 5.0)));
    assert!(geometry.contains(&Point::new(2.0, 2.0)));
}

#[test]
fn test_parse_rejects_unknown_type() {
    let value = json!({ "type": "GeometryCollection", "coordinates": [] });
    assert!(Geometry::from_geojson(&value).is_err());
}

#[test]
fn test_multipolygon_area_and_perimeter() {
    let square = |x: f64| {
        PolygonGeometry::new(vec![
            Point::new(x, 0.0),
            Point::new(x + 1.0, 0.0),
            Point::new(x + 1.0, 1.0),
            Point::new(x, 1.0),
        ])
    };
    let multi = Geometry::MultiPolygon(vec![square(0.0), square(5.0)]);
    assert!((multi.area() - 2.0).abs() < 1e-9);
    assert!((multi.perimeter() - 8.0).abs() < 1e-9);
    assert_eq!(multi.vertex_count(), 8);
}
