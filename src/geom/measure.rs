use geo::{
    Area, Closest, ClosestPoint, CoordsIter, Distance, Euclidean, Geodesic, GeodesicArea, Geometry, Intersects,
    MultiPolygon, Point, Rect,
};
use serde::{Deserialize, Serialize};

/// Meters per degree of latitude (lower bound, so padded searches never miss).
const METERS_PER_DEGREE: f64 = 110_574.0;

/// How coordinates are interpreted when measuring area and distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AreaMethod {
    /// Lon/lat degrees; areas and distances on the WGS84 ellipsoid, in meters.
    #[default]
    Geodesic,
    /// Coordinates already projected to meters.
    Planar,
}

impl AreaMethod {
    /// Area of `shape` in square meters.
    pub fn area(&self, shape: &MultiPolygon<f64>) -> f64 {
        match self {
            AreaMethod::Geodesic => shape.geodesic_area_unsigned(),
            AreaMethod::Planar => shape.unsigned_area(),
        }
    }

    /// Distance between two points in meters.
    pub fn distance(&self, a: Point<f64>, b: Point<f64>) -> f64 {
        match self {
            AreaMethod::Geodesic => Geodesic.distance(a, b),
            AreaMethod::Planar => Euclidean.distance(a, b),
        }
    }

    /// Distance from `point` to the nearest part of `shape`; zero inside it.
    pub fn distance_to_shape(&self, point: Point<f64>, shape: &MultiPolygon<f64>) -> f64 {
        if shape.intersects(&point) { return 0.0 }

        match shape.closest_point(&point) {
            Closest::Intersection(_) => 0.0,
            Closest::SinglePoint(nearest) => self.distance(point, nearest),
            Closest::Indeterminate => f64::INFINITY,
        }
    }

    /// Distance from any part of `geometry` to `shape`; zero when they meet.
    ///
    /// Geodesic distances take the closest pair in lon/lat space and measure
    /// it on the ellipsoid. Between two disjoint polylines that pair always
    /// has a vertex of one side, so both vertex sets are checked against the
    /// other geometry.
    pub fn distance_between(&self, geometry: &Geometry<f64>, shape: &MultiPolygon<f64>) -> f64 {
        if geometry.intersects(shape) { return 0.0 }

        match self {
            AreaMethod::Planar => Euclidean.distance(geometry, shape),
            AreaMethod::Geodesic => {
                let from_feature = geometry.coords_iter()
                    .map(|c| self.distance_to_shape(Point::from(c), shape));
                let from_shape = shape.coords_iter()
                    .map(|c| {
                        let vertex = Point::from(c);
                        match geometry.closest_point(&vertex) {
                            Closest::Intersection(_) => 0.0,
                            Closest::SinglePoint(nearest) => self.distance(vertex, nearest),
                            Closest::Indeterminate => f64::INFINITY,
                        }
                    });
                from_feature.chain(from_shape).fold(f64::INFINITY, f64::min)
            }
        }
    }

    /// Search padding (x, y) in coordinate units covering `meters` around `rect`.
    pub fn padding(&self, rect: &Rect<f64>, meters: f64) -> (f64, f64) {
        if meters <= 0.0 { return (0.0, 0.0) }

        match self {
            AreaMethod::Planar => (meters, meters),
            AreaMethod::Geodesic => {
                let dy = meters / METERS_PER_DEGREE;
                let max_lat = rect.min().y.abs().max(rect.max().y.abs()) + dy;
                let cos_lat = max_lat.min(89.0).to_radians().cos();
                (dy / cos_lat, dy)
            }
        }
    }
}
