// geodesy.rs
// Coordinates plus the two geometric primitives the pipeline needs:
// geodesic distance between languages and the centroid of a family's members

use geo::{Area, Centroid, ConvexHull, GeodesicDistance, MultiPoint, Point};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A WGS-84 position in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Check the position lies on the globe
    pub fn validate(&self) -> Result<(), DistanceError> {
        let on_globe = self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude);

        if on_globe {
            Ok(())
        } else {
            Err(DistanceError::OffGlobe(*self))
        }
    }

    // geo wants x = longitude, y = latitude
    fn to_point(self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistanceError {
    #[error("coordinates {0} are not a position on the globe")]
    OffGlobe(Coordinates),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("need at least 3 distinct member positions, found {0}")]
    TooFewPoints(usize),

    #[error("member positions are collinear")]
    Collinear,
}

/// Geodesic distance on the WGS-84 ellipsoid, in kilometres
pub fn distance_km(a: Coordinates, b: Coordinates) -> Result<f64, DistanceError> {
    a.validate()?;
    b.validate()?;
    Ok(a.to_point().geodesic_distance(&b.to_point()) / 1000.0)
}

/// Centroid of the convex polygon spanned by `points`.
///
/// Duplicated positions are counted once. Fewer than three distinct positions,
/// or positions that span no area, have no meaningful centroid.
pub fn hull_centroid(points: &[Coordinates]) -> Result<Coordinates, GeometryError> {
    let mut distinct: Vec<Coordinates> = Vec::with_capacity(points.len());
    for point in points {
        if !distinct.contains(point) {
            distinct.push(*point);
        }
    }

    if distinct.len() < 3 {
        return Err(GeometryError::TooFewPoints(distinct.len()));
    }

    let cloud = MultiPoint::from(
        distinct
            .iter()
            .map(|c| c.to_point())
            .collect::<Vec<Point<f64>>>(),
    );
    let hull = cloud.convex_hull();

    if hull.unsigned_area() == 0.0 {
        return Err(GeometryError::Collinear);
    }

    hull.centroid()
        .map(|p| Coordinates::new(p.y(), p.x()))
        .ok_or(GeometryError::Collinear)
}
