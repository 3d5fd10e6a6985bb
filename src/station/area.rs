use geo::{Contains, LineString, Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;
use crate::station::Station;

/// Catchment boundary of one station: a closed ring or an open polyline.
///
/// Closed boundaries support membership tests; open boundaries only
/// support crossing detection against their edges.
#[derive(Clone, Debug)]
pub struct StationArea {
    pub station: Station,
    boundary: Vec<Point>,
    closed: bool,
    /// Ring form of a closed boundary, built once for membership tests.
    ring: Option<Polygon>,
}

/// Normalized upstream shape of a [`StationArea`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StationAreaRecord {
    pub station: Station,
    pub boundary: Vec<LatLng>,
    pub closed: bool,
}

impl From<StationAreaRecord> for StationArea {
    fn from(record: StationAreaRecord) -> Self {
        StationArea::new(
            record.station,
            record.boundary.iter().map(LatLng::point),
            record.closed,
        )
    }
}

impl StationArea {
    pub fn new(station: Station, boundary: impl IntoIterator<Item = Point>, closed: bool) -> Self {
        let boundary: Vec<Point> = boundary.into_iter().collect();
        let ring = closed.then(|| {
            Polygon::new(
                LineString::from(boundary.iter().map(|point| point.0).collect::<Vec<_>>()),
                vec![],
            )
        });

        StationArea {
            station,
            boundary,
            closed,
            ring,
        }
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// Membership test. Open polylines bound no interior, so they never
    /// contain a point.
    pub fn contains(&self, point: &Point) -> bool {
        self.ring
            .as_ref()
            .is_some_and(|ring| ring.contains(point))
    }

    /// Boundary edges, including the closing edge of a ring.
    pub fn edges(&self) -> impl Iterator<Item = (&Point, &Point)> {
        let wrap = self
            .closed
            .then(|| self.boundary.last().zip(self.boundary.first()))
            .flatten()
            // A ring given with an explicit duplicate endpoint needs no
            // synthetic closing edge.
            .filter(|(last, first)| last != first);

        self.boundary
            .windows(2)
            .map(|pair| (&pair[0], &pair[1]))
            .chain(wrap.into_iter())
    }
}
