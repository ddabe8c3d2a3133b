//! Geographic primitives used by events and places.

use geo::HaversineDestination;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

use shared::validation::{validate_latitude, validate_longitude, validate_radius};

/// Number of vertices used to approximate a circle.
pub const CIRCLE_SEGMENTS: usize = 32;

/// Minimum number of distinct vertices in a polygon.
pub const MIN_POLYGON_VERTICES: usize = 3;

/// A geographic point, serialized as a GeoJSON position `[lon, lat]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub lon: f64,
    pub lat: f64,
}

impl Point {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl From<[f64; 2]> for Point {
    fn from([lon, lat]: [f64; 2]) -> Self {
        Self { lon, lat }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.lon, p.lat]
    }
}

impl Validate for Point {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_longitude(self.lon) {
            errors.add("lon", e);
        }
        if let Err(e) = validate_latitude(self.lat) {
            errors.add("lat", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A circle given by its center and radius in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn new(center: Point, radius: f64) -> Self {
        Self { center, radius }
    }
}

impl Validate for Circle {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_longitude(self.center.lon) {
            errors.add("center", e);
        } else if let Err(e) = validate_latitude(self.center.lat) {
            errors.add("center", e);
        }
        if let Err(e) = validate_radius(self.radius) {
            errors.add("radius", e);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// A polygon given by its ordered vertices.
///
/// The ring may be open or closed; [`IndexGeometry`] closes it when needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polygon(pub Vec<Point>);

impl Polygon {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    fn distinct_vertices(&self) -> usize {
        match (self.0.first(), self.0.last()) {
            (Some(first), Some(last)) if self.0.len() > 1 && first == last => self.0.len() - 1,
            _ => self.0.len(),
        }
    }
}

impl Validate for Polygon {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if self.distinct_vertices() < MIN_POLYGON_VERTICES {
            let mut err = ValidationError::new("polygon_vertices");
            err.message = Some("Polygon needs at least 3 vertices".into());
            errors.add("polygon", err);
        }
        for point in &self.0 {
            if let Err(e) = validate_longitude(point.lon).and(validate_latitude(point.lat)) {
                errors.add("polygon", e);
                break;
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Searchable geometry kept next to a place in the store.
///
/// Serialized as a GeoJSON geometry object. It is derived from the place's
/// circle or polygon and is never handed back to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum IndexGeometry {
    Polygon { coordinates: Vec<Vec<Point>> },
}

impl IndexGeometry {
    /// Outer ring of the geometry, always closed.
    pub fn exterior(&self) -> &[Point] {
        match self {
            IndexGeometry::Polygon { coordinates } => {
                coordinates.first().map(Vec::as_slice).unwrap_or(&[])
            }
        }
    }
}

impl From<&Polygon> for IndexGeometry {
    fn from(polygon: &Polygon) -> Self {
        let mut ring = polygon.0.clone();
        if let (Some(first), Some(last)) = (ring.first().copied(), ring.last()) {
            if first != *last {
                ring.push(first);
            }
        }
        IndexGeometry::Polygon {
            coordinates: vec![ring],
        }
    }
}

/// Approximates a circle with a [`CIRCLE_SEGMENTS`]-gon.
///
/// Vertices lie on the circle at evenly spaced bearings, clockwise from north.
pub fn circle_to_polygon(circle: &Circle) -> Polygon {
    let center = geo::Point::new(circle.center.lon, circle.center.lat);
    let step = 360.0 / CIRCLE_SEGMENTS as f64;
    let points = (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let vertex = center.haversine_destination(step * i as f64, circle.radius);
            Point::new(vertex.x(), vertex.y())
        })
        .collect();
    Polygon(points)
}
