use geo::Point;
use petgraph::stable_graph::NodeIndex;

/// Arena handle of one node within a [`RouteGraph`](super::RouteGraph).
///
/// Node identity is scoped to the owning graph instance; handles from a
/// released graph must not be dereferenced against another.
pub type NodeIx = NodeIndex<u32>;

/// One node of the materialized line shape.
#[derive(Clone, Debug)]
pub enum RouteNode {
    /// Anchored at a junction tag, degree 1 to 3.
    ///
    /// Expansion is lazy: the first traversal through the node pulls in
    /// every sibling segment sharing its tag. The expansion is cached and
    /// never re-run.
    End {
        position: Point,
        tag: String,
        expanded: bool,
    },
    /// Interior shape point of one segment, degree exactly 2.
    Middle { position: Point },
}

impl RouteNode {
    pub fn position(&self) -> Point {
        match self {
            RouteNode::End { position, .. } => *position,
            RouteNode::Middle { position } => *position,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, RouteNode::End { .. })
    }
}
