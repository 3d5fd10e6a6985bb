use crate::filter::TrackState;
use crate::geo::Projection;
use crate::route::NodeIx;

/// One hypothesis of the agent's position on the line.
///
/// The edge orientation defines the cursor's 1-D filter axis: position
/// grows from `edge_start` toward `edge_end`, continuing the axis of the
/// generation the cursor descended from. `path_offset` is the axis value
/// at `edge_start`.
#[derive(Clone, Debug, PartialEq)]
pub struct Cursor {
    pub edge_start: NodeIx,
    pub edge_end: NodeIx,
    /// Projection of the producing fix onto the cursor's edge.
    pub projection: Projection,
    /// +1 travels `edge_start` -> `edge_end` along the axis, -1 against.
    pub direction: i8,
    /// Axis metres accumulated at `edge_start`.
    pub path_offset: f64,
    pub state: TrackState,
    /// Latched once the filtered speed was high enough to trust the sign.
    pub direction_locked: bool,
}

impl Cursor {
    /// The raw 1-D measurement this cursor's projection represents.
    pub fn measured_position(&self) -> f64 {
        self.path_offset + self.projection.fraction * self.projection.edge_length
    }

    /// Node the cursor is believed to be heading toward.
    pub fn ahead(&self) -> NodeIx {
        if self.direction >= 0 {
            self.edge_end
        } else {
            self.edge_start
        }
    }

    /// Node behind the believed travel direction.
    pub fn behind(&self) -> NodeIx {
        if self.direction >= 0 {
            self.edge_start
        } else {
            self.edge_end
        }
    }
}
