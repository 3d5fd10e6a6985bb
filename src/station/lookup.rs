use geo::Point;
use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::station::Station;

/// Point-to-station resolution, consumed by the tracking core as a black
/// box.
///
/// A production deployment typically owns a prebuilt spatial index over
/// the full station dataset; [`StationIndex`] is the bundled reference
/// implementation.
pub trait StationLookup {
    /// Resolves the station nearest to `point`, if any is indexed.
    fn nearest(&self, point: &Point) -> Option<&Station>;
}

/// R-tree backed [`StationLookup`].
pub struct StationIndex {
    tree: RTree<IndexedStation>,
}

struct IndexedStation {
    position: [f64; 2],
    station: Station,
}

impl RTreeObject for IndexedStation {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedStation {
    // Squared degree-space distance; the index only ever ranks stations
    // of one line against each other, where the planar distortion is
    // uniform enough not to reorder them.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

impl StationIndex {
    pub fn new(stations: impl IntoIterator<Item = Station>) -> Self {
        let entries = stations
            .into_iter()
            .map(|station| IndexedStation {
                position: [station.point().x(), station.point().y()],
                station,
            })
            .collect();

        StationIndex {
            tree: RTree::bulk_load(entries),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl StationLookup for StationIndex {
    fn nearest(&self, point: &Point) -> Option<&Station> {
        self.tree
            .nearest_neighbor(&[point.x(), point.y()])
            .map(|indexed| &indexed.station)
    }
}
