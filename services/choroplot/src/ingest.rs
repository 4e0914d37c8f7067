//! GeoJSON ingestion into a feature table.

use anyhow::{bail, Result};
use choro_common::{FeatureTable, Geometry, Polygon, Ring};
use geojson::{GeoJson, Value};

/// Convert a GeoJSON feature collection into a feature table.
///
/// Numeric properties become attribute columns. Geometry kinds without an
/// areal interpretation convert to the variants the pipeline skips, so a
/// mixed collection still renders.
pub fn feature_table(geojson: &GeoJson) -> Result<FeatureTable> {
    let collection = match geojson {
        GeoJson::FeatureCollection(collection) => collection,
        _ => bail!("expected a GeoJSON FeatureCollection"),
    };

    let mut table = FeatureTable::new();
    for feature in &collection.features {
        let Some(geometry) = feature.geometry.as_ref() else {
            continue;
        };
        let geometry = convert_geometry(&geometry.value);

        let mut attrs: Vec<(String, f64)> = Vec::new();
        if let Some(properties) = &feature.properties {
            for (name, value) in properties {
                if let Some(number) = value.as_f64() {
                    attrs.push((name.clone(), number));
                }
            }
        }
        let attr_refs: Vec<(&str, f64)> =
            attrs.iter().map(|(name, v)| (name.as_str(), *v)).collect();
        table.push(geometry, &attr_refs);
    }
    Ok(table)
}

fn position(p: &[f64]) -> (f64, f64) {
    (
        p.first().copied().unwrap_or(f64::NAN),
        p.get(1).copied().unwrap_or(f64::NAN),
    )
}

fn convert_ring(ring: &[Vec<f64>]) -> Ring {
    Ring::new(ring.iter().map(|p| position(p)).collect())
}

fn convert_polygon(rings: &[Vec<Vec<f64>>]) -> Polygon {
    match rings.split_first() {
        Some((exterior, holes)) => Polygon::with_holes(
            convert_ring(exterior),
            holes.iter().map(|ring| convert_ring(ring)).collect(),
        ),
        None => Polygon::new(Ring::new(Vec::new())),
    }
}

fn convert_geometry(value: &Value) -> Geometry {
    match value {
        Value::Polygon(rings) => Geometry::Polygon(convert_polygon(rings)),
        Value::MultiPolygon(polygons) => Geometry::MultiPolygon(
            polygons.iter().map(|rings| convert_polygon(rings)).collect(),
        ),
        Value::Point(p) => Geometry::Point(position(p)),
        Value::LineString(line) => Geometry::Line(line.iter().map(|p| position(p)).collect()),
        Value::MultiPoint(points) => Geometry::Line(points.iter().map(|p| position(p)).collect()),
        Value::MultiLineString(lines) => Geometry::Line(
            lines
                .iter()
                .flat_map(|line| line.iter().map(|p| position(p)))
                .collect(),
        ),
        Value::GeometryCollection(_) => Geometry::Line(Vec::new()),
    }
}
