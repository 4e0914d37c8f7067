//! Geometry model for areal features.
//!
//! The pipeline only fills simple polygons and multi-polygons; the other
//! kinds exist so callers can carry mixed collections and have the
//! non-areal rows skipped instead of rejected.

use crate::bbox::BoundingBox;

/// An ordered ring of 2-D coordinates describing a polygon boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    coords: Vec<(f64, f64)>,
}

impl Ring {
    pub fn new(coords: Vec<(f64, f64)>) -> Self {
        Self { coords }
    }

    pub fn coords(&self) -> &[(f64, f64)] {
        &self.coords
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Whether the ring repeats its first coordinate at the end. Rings
    /// without the repeat are treated as implicitly closed.
    pub fn is_explicitly_closed(&self) -> bool {
        match (self.coords.first(), self.coords.last()) {
            (Some(first), Some(last)) => first == last && self.coords.len() > 1,
            _ => false,
        }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::from_points(self.coords.iter().copied())
    }
}

/// A simple polygon: one exterior ring plus any interior rings (holes).
///
/// Only the exterior takes part in rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub exterior: Ring,
    pub holes: Vec<Ring>,
}

impl Polygon {
    pub fn new(exterior: Ring) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(exterior: Ring, holes: Vec<Ring>) -> Self {
        Self { exterior, holes }
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        self.exterior.bounds()
    }
}

/// A feature geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
    Point((f64, f64)),
    Line(Vec<(f64, f64)>),
}

impl Geometry {
    /// Whether the geometry has an areal interpretation the renderer fills.
    pub fn is_areal(&self) -> bool {
        matches!(self, Geometry::Polygon(_) | Geometry::MultiPolygon(_))
    }

    pub fn bounds(&self) -> Option<BoundingBox> {
        match self {
            Geometry::Polygon(polygon) => polygon.bounds(),
            Geometry::MultiPolygon(members) => members
                .iter()
                .filter_map(Polygon::bounds)
                .reduce(|a, b| a.union(&b)),
            Geometry::Point((x, y)) => Some(BoundingBox::new(*x, *y, *x, *y)),
            Geometry::Line(coords) => BoundingBox::from_points(coords.iter().copied()),
        }
    }
}
