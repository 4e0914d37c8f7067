//! Tests for the geometry flattener.

use choro_common::{Geometry, Polygon, Ring};
use renderer::flatten;

fn square(x: f64, y: f64, size: f64) -> Polygon {
    Polygon::new(Ring::new(vec![
        (x, y),
        (x + size, y),
        (x + size, y + size),
        (x, y + size),
        (x, y),
    ]))
}

#[test]
fn test_simple_polygons_flatten_one_to_one() {
    let geometries = vec![
        Geometry::Polygon(square(0.0, 0.0, 1.0)),
        Geometry::Polygon(square(2.0, 0.0, 1.0)),
        Geometry::Polygon(square(4.0, 0.0, 1.0)),
    ];
    let values = vec![5.0, 25.0, 17.5];

    let (boundaries, flat) = flatten(&geometries, &values);

    assert_eq!(boundaries.len(), geometries.len());
    assert_eq!(flat, values);
    for ring in &boundaries {
        assert!(ring.is_explicitly_closed());
    }
}

#[test]
fn test_multi_polygon_emits_one_boundary_per_member() {
    let members = vec![
        square(0.0, 0.0, 1.0),
        square(3.0, 0.0, 1.0),
        square(6.0, 0.0, 1.0),
    ];
    let geometries = vec![Geometry::MultiPolygon(members)];

    let (boundaries, flat) = flatten(&geometries, &[7.5]);

    assert_eq!(boundaries.len(), 3);
    assert_eq!(flat, vec![7.5, 7.5, 7.5]);
}

#[test]
fn test_non_areal_geometries_are_skipped_silently() {
    let geometries = vec![
        Geometry::Point((1.0, 1.0)),
        Geometry::Polygon(square(0.0, 0.0, 1.0)),
        Geometry::Line(vec![(0.0, 0.0), (5.0, 5.0)]),
    ];

    let (boundaries, flat) = flatten(&geometries, &[1.0, 2.0, 3.0]);

    assert_eq!(boundaries.len(), 1);
    assert_eq!(flat, vec![2.0]);
}

#[test]
fn test_holes_are_ignored() {
    let outer = Ring::new(vec![
        (0.0, 0.0),
        (10.0, 0.0),
        (10.0, 10.0),
        (0.0, 10.0),
        (0.0, 0.0),
    ]);
    let hole = Ring::new(vec![
        (4.0, 4.0),
        (6.0, 4.0),
        (6.0, 6.0),
        (4.0, 6.0),
        (4.0, 4.0),
    ]);
    let geometries = vec![Geometry::Polygon(Polygon::with_holes(outer.clone(), vec![hole]))];

    let (boundaries, flat) = flatten(&geometries, &[1.0]);

    assert_eq!(boundaries.len(), 1);
    assert_eq!(boundaries[0], outer);
    assert_eq!(flat, vec![1.0]);
}

#[test]
fn test_empty_input() {
    let (boundaries, flat) = flatten(&[], &[]);
    assert!(boundaries.is_empty());
    assert!(flat.is_empty());
}
