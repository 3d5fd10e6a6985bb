//! Stations, their catchment areas, and nearest-station lookup.

#[doc(hidden)]
pub mod area;
#[doc(hidden)]
pub mod lookup;

#[doc(inline)]
pub use area::{StationArea, StationAreaRecord};
#[doc(inline)]
pub use lookup::{StationIndex, StationLookup};

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// Identity of a station within one line dataset.
pub type StationId = u32;

/// One station on the tracked line.
///
/// Stations are compared by [`id`](#structfield.id); names and positions
/// are carried through for the consumer.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub position: LatLng,
}

impl Station {
    pub fn new(id: StationId, name: impl Into<String>, position: LatLng) -> Self {
        Station {
            id,
            name: name.into(),
            position,
        }
    }

    pub fn point(&self) -> Point {
        self.position.point()
    }
}

impl PartialEq for Station {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Station {}
