use geo::Point;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::geo::{project, Projection};
use crate::route::{NodeIx, RouteGraph};
use crate::track::cursor::Cursor;

/// A branch stops descending once its projection distance exceeds this
/// multiple of the branch's running minimum.
pub(crate) const BRANCH_PRUNE_RATIO: f64 = 2.0;

/// Descent side of a branch search, relative to the cursor's edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Descent {
    /// Past the cursor's `edge_end`; the axis keeps growing.
    Forward,
    /// Past the cursor's `edge_start`; the axis shrinks.
    Backward,
}

/// Locally-best re-anchoring found by one branch.
///
/// The edge is oriented so the candidate's axis continues the searched
/// cursor's axis, which keeps the carried filter state meaningful.
#[derive(Clone, Copy, Debug)]
pub(crate) struct BranchCandidate {
    pub edge_start: NodeIx,
    pub edge_end: NodeIx,
    pub projection: Projection,
    pub path_offset: f64,
}

impl BranchCandidate {
    pub fn measured_position(&self) -> f64 {
        self.path_offset + self.projection.fraction * self.projection.edge_length
    }
}

pub(crate) struct BranchOutcome {
    /// Deduplicated leaf candidates, one per terminated branch.
    pub candidates: Vec<BranchCandidate>,
    /// Minimum projection distance over every leaf.
    pub best_distance: f64,
}

struct Frame {
    node: NodeIx,
    previous: NodeIx,
    /// Axis value at `node`.
    offset: f64,
    best_distance: f64,
    best: BranchCandidate,
}

/// Depth-first branch search re-anchoring `cursor` against `point`.
///
/// Runs on an explicit worklist. Every visited node projects the fix
/// onto each not-yet-visited outgoing edge; a branch records its running
/// best and stops once an edge projects farther than
/// [`BRANCH_PRUNE_RATIO`] times that best. Fan-out at a junction splits
/// the branch, each side inheriting the running best at the split.
pub(crate) fn branch_search(
    graph: &mut RouteGraph,
    cursor: &Cursor,
    point: &Point,
    descent: Descent,
) -> BranchOutcome {
    let start = graph.position(cursor.edge_start);
    let end = graph.position(cursor.edge_end);

    let seed_projection = project(point, &start, &end);
    let seed = BranchCandidate {
        edge_start: cursor.edge_start,
        edge_end: cursor.edge_end,
        projection: seed_projection,
        path_offset: cursor.path_offset,
    };

    // The seed edge counts as visited in walk orientation; its reverse
    // stays reachable through the iterator's retained-previous rule so a
    // switchback fold remains searchable.
    let mut visited: FxHashSet<(NodeIx, NodeIx)> = FxHashSet::default();
    let mut stack = match descent {
        Descent::Forward => {
            visited.insert((cursor.edge_start, cursor.edge_end));
            vec![Frame {
                node: cursor.edge_end,
                previous: cursor.edge_start,
                offset: cursor.path_offset + seed_projection.edge_length,
                best_distance: seed_projection.distance,
                best: seed,
            }]
        }
        Descent::Backward => {
            visited.insert((cursor.edge_end, cursor.edge_start));
            vec![Frame {
                node: cursor.edge_start,
                previous: cursor.edge_end,
                offset: cursor.path_offset,
                best_distance: seed_projection.distance,
                best: seed,
            }]
        }
    };

    let mut leaves: Vec<BranchCandidate> = Vec::new();

    while let Some(frame) = stack.pop() {
        let mut descended = false;

        for neighbor in graph.onward(frame.node, frame.previous) {
            if !visited.insert((frame.node, neighbor)) {
                continue;
            }

            let near = graph.position(frame.node);
            let far = graph.position(neighbor);

            // Walk edges keep the axis continuous: forward edges extend
            // it, backward edges are oriented to point back toward the
            // original cursor.
            let candidate = match descent {
                Descent::Forward => {
                    let projection = project(point, &near, &far);
                    BranchCandidate {
                        edge_start: frame.node,
                        edge_end: neighbor,
                        projection,
                        path_offset: frame.offset,
                    }
                }
                Descent::Backward => {
                    let projection = project(point, &far, &near);
                    BranchCandidate {
                        edge_start: neighbor,
                        edge_end: frame.node,
                        projection,
                        path_offset: frame.offset - projection.edge_length,
                    }
                }
            };

            let distance = candidate.projection.distance;
            if distance > BRANCH_PRUNE_RATIO * frame.best_distance {
                // This side of the branch is done; keep its best so far.
                leaves.push(frame.best);
                continue;
            }

            let (best_distance, best) = if distance < frame.best_distance {
                (distance, candidate)
            } else {
                (frame.best_distance, frame.best)
            };

            let offset = match descent {
                Descent::Forward => frame.offset + candidate.projection.edge_length,
                Descent::Backward => frame.offset - candidate.projection.edge_length,
            };

            stack.push(Frame {
                node: neighbor,
                previous: frame.node,
                offset,
                best_distance,
                best,
            });
            descended = true;
        }

        if !descended {
            leaves.push(frame.best);
        }
    }

    // Split branches that never improved on a shared prefix all report
    // the same best; collapse them.
    let mut distinct: FxHashMap<(NodeIx, NodeIx), BranchCandidate> = FxHashMap::default();
    for leaf in leaves {
        distinct
            .entry((leaf.edge_start, leaf.edge_end))
            .and_modify(|held| {
                if leaf.projection.distance < held.projection.distance {
                    *held = leaf;
                }
            })
            .or_insert(leaf);
    }

    let candidates: Vec<BranchCandidate> = distinct.into_values().collect();
    let best_distance = candidates
        .iter()
        .map(|candidate| candidate.projection.distance)
        .fold(f64::INFINITY, f64::min);

    BranchOutcome {
        candidates,
        best_distance,
    }
}
