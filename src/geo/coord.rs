use geo::Point;
use serde::{Deserialize, Serialize};

/// `LatLng`
/// The latitude, longitude pair structure, the wire shape in which all
/// upstream loaders hand positions to this crate.
///
/// Converted to a [`geo::Point`] (`x` = lng, `y` = lat) at the boundary.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        LatLng { lat, lng }
    }

    pub fn point(&self) -> Point {
        Point::new(self.lng, self.lat)
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<LatLng> for Point {
    fn from(value: LatLng) -> Self {
        value.point()
    }
}

impl From<Point> for LatLng {
    fn from(value: Point) -> Self {
        LatLng::new(value.y(), value.x())
    }
}
