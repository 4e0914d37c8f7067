//! Flattens areal features into per-polygon boundaries and values.

use choro_common::{Geometry, Ring};

/// Expand geometries into one exterior boundary per simple polygon.
///
/// Multi-polygons contribute one boundary per member, each carrying the
/// row's value. Non-areal geometries emit nothing; the skip is policy,
/// not an error. The two returned sequences are index-aligned.
pub fn flatten(geometries: &[Geometry], values: &[f64]) -> (Vec<Ring>, Vec<f64>) {
    let mut boundaries = Vec::with_capacity(geometries.len());
    let mut flat_values = Vec::with_capacity(values.len());

    for (geometry, &value) in geometries.iter().zip(values) {
        match geometry {
            Geometry::Polygon(polygon) => {
                boundaries.push(polygon.exterior.clone());
                flat_values.push(value);
            }
            Geometry::MultiPolygon(members) => {
                for member in members {
                    boundaries.push(member.exterior.clone());
                    flat_values.push(value);
                }
            }
            Geometry::Point(_) | Geometry::Line(_) => {}
        }
    }

    (boundaries, flat_values)
}
