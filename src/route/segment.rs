use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

/// One shape run of the line between two tagged junction endpoints.
///
/// Segments sharing a tag are physically joined at that endpoint. This is
/// the normalized shape produced by upstream dataset loaders; the crate
/// consumes it as-is.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Ordered shape points, at least two.
    pub points: Vec<LatLng>,
    /// Junction tag of the first shape point.
    pub start_tag: String,
    /// Junction tag of the last shape point.
    pub end_tag: String,
}

impl RouteSegment {
    pub fn new(
        points: impl IntoIterator<Item = LatLng>,
        start_tag: impl Into<String>,
        end_tag: impl Into<String>,
    ) -> Self {
        RouteSegment {
            points: points.into_iter().collect(),
            start_tag: start_tag.into(),
            end_tag: end_tag.into(),
        }
    }
}
