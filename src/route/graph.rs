use geo::Point;
use log::debug;
use petgraph::stable_graph::StableUnGraph;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::geo::project::local_offset;
use crate::geo::{measure_distance, project, Projection};
use crate::route::error::ConstructionError;
use crate::route::node::{NodeIx, RouteNode};
use crate::route::segment::RouteSegment;

pub(crate) type GraphStructure = StableUnGraph<RouteNode, f64>;

/// Result of anchoring a point on the line: the edge carrying the
/// globally nearest projection, materialized into the arena.
#[derive(Clone, Copy, Debug)]
pub struct Anchor {
    pub edge_start: NodeIx,
    pub edge_end: NodeIx,
    pub projection: Projection,
}

/// Graph model of one rail line, materialized lazily from its shape
/// segments.
///
/// Nodes live in an index-addressed arena, so the bidirectional links of
/// the physical line never form owning reference cycles; [`release`]
/// simply drops the arena.
///
/// [`release`]: RouteGraph::release
pub struct RouteGraph {
    graph: GraphStructure,
    /// Junction tag to its allocated end node.
    junctions: FxHashMap<String, NodeIx>,
    /// Normalized input shape, kept for lazy materialization.
    segments: Vec<Shape>,
    /// Segment indices joined at each junction tag.
    by_tag: FxHashMap<String, SmallVec<[usize; 3]>>,
    /// Node chain per materialized segment, aligned with its points.
    chains: Vec<Option<Vec<NodeIx>>>,
}

struct Shape {
    points: Vec<Point>,
    start_tag: String,
    end_tag: String,
}

impl std::fmt::Debug for RouteGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RouteGraph with {} segments, {} materialized nodes",
            self.segments.len(),
            self.graph.node_count()
        )
    }
}

impl RouteGraph {
    /// Validates and ingests the line shape.
    ///
    /// Validation is eager even though materialization is lazy: a
    /// malformed line must fail before any session is created.
    pub fn new(segments: Vec<RouteSegment>) -> Result<RouteGraph, ConstructionError> {
        let mut by_tag: FxHashMap<String, SmallVec<[usize; 3]>> = FxHashMap::default();

        for (index, segment) in segments.iter().enumerate() {
            if segment.points.len() < 2 {
                return Err(ConstructionError::ShortSegment { index });
            }

            if segment.start_tag.is_empty() || segment.end_tag.is_empty() {
                return Err(ConstructionError::DanglingTag { index });
            }

            if segment.points.iter().any(|point| !point.is_finite()) {
                return Err(ConstructionError::InvalidCoordinate { index });
            }

            by_tag.entry(segment.start_tag.clone()).or_default().push(index);
            by_tag.entry(segment.end_tag.clone()).or_default().push(index);
        }

        for (tag, joined) in &by_tag {
            if joined.len() > 3 {
                return Err(ConstructionError::JunctionDegree {
                    tag: tag.clone(),
                    degree: joined.len(),
                });
            }
        }

        let chains = vec![None; segments.len()];
        let segments = segments
            .into_iter()
            .map(|segment| Shape {
                points: segment.points.iter().map(|point| point.point()).collect(),
                start_tag: segment.start_tag,
                end_tag: segment.end_tag,
            })
            .collect();

        Ok(RouteGraph {
            graph: GraphStructure::default(),
            junctions: FxHashMap::default(),
            segments,
            by_tag,
            chains,
        })
    }

    #[inline]
    pub fn position(&self, node: NodeIx) -> Point {
        self.graph[node].position()
    }

    #[inline]
    pub fn node(&self, node: NodeIx) -> &RouteNode {
        &self.graph[node]
    }

    /// Length of the edge between two adjacent nodes, in metres.
    #[inline]
    pub fn edge_length(&self, a: NodeIx, b: NodeIx) -> f64 {
        measure_distance(&self.position(a), &self.position(b))
    }

    /// Count of nodes materialized so far.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn degree(&self, node: NodeIx) -> usize {
        self.graph.neighbors(node).count()
    }

    /// Whether the junction owning `tag` has been expanded yet.
    pub fn expanded(&self, tag: &str) -> Option<bool> {
        let node = self.junctions.get(tag)?;
        match &self.graph[*node] {
            RouteNode::End { expanded, .. } => Some(*expanded),
            RouteNode::Middle { .. } => None,
        }
    }

    /// Finds the globally nearest projection of `point` across every raw
    /// segment, materializing the winning segment into the arena.
    pub fn nearest_projection(&mut self, point: &Point) -> Option<Anchor> {
        let mut best: Option<(usize, usize, Projection)> = None;

        for (index, segment) in self.segments.iter().enumerate() {
            for (offset, pair) in segment.points.windows(2).enumerate() {
                let projection = project(point, &pair[0], &pair[1]);
                let closer = best
                    .as_ref()
                    .is_none_or(|(_, _, held)| projection.distance < held.distance);

                if closer {
                    best = Some((index, offset, projection));
                }
            }
        }

        let (index, offset, projection) = best?;
        self.materialize(index);

        let chain = self.chains[index].as_ref()?;
        Some(Anchor {
            edge_start: chain[offset],
            edge_end: chain[offset + 1],
            projection,
        })
    }

    /// Neighbors reachable onward from `node` when arriving via
    /// `previous`.
    ///
    /// Candidates "behind" the arrival direction (negative dot product of
    /// the in-vector and the out-vector) are excluded, with one exception:
    /// `previous` itself is retained so a search can detect a reversal.
    /// An interior node always yields exactly its other neighbor.
    ///
    /// Traversing an unexpanded junction expands it first, which may
    /// materialize sibling segments into the arena.
    pub fn onward(&mut self, node: NodeIx, previous: NodeIx) -> SmallVec<[NodeIx; 3]> {
        self.expand(node);

        let current = self.graph[node].position();
        let mut out = SmallVec::new();

        match &self.graph[node] {
            RouteNode::Middle { .. } => {
                for candidate in self.graph.neighbors(node) {
                    if candidate != previous && !out.contains(&candidate) {
                        out.push(candidate);
                    }
                }
            }
            RouteNode::End { .. } => {
                let arrival = local_offset(&self.graph[previous].position(), &current);

                for candidate in self.graph.neighbors(node) {
                    if out.contains(&candidate) {
                        continue;
                    }

                    if candidate == previous {
                        out.push(candidate);
                        continue;
                    }

                    let departure = local_offset(&current, &self.graph[candidate].position());
                    if arrival.0 * departure.0 + arrival.1 * departure.1 >= 0.0 {
                        out.push(candidate);
                    }
                }
            }
        }

        out
    }

    /// Tears the arena down explicitly.
    ///
    /// Any [`NodeIx`] held by a caller is invalidated; the owning session
    /// guarantees no cursor survives past this call.
    pub fn release(&mut self) {
        self.graph.clear();
        self.junctions.clear();
        self.chains.iter_mut().for_each(|chain| *chain = None);
    }

    /// Allocates (or reuses) the end node anchored at `tag`.
    fn junction(&mut self, tag: &str, position: Point) -> NodeIx {
        if let Some(&node) = self.junctions.get(tag) {
            return node;
        }

        let node = self.graph.add_node(RouteNode::End {
            position,
            tag: tag.to_owned(),
            expanded: false,
        });

        self.junctions.insert(tag.to_owned(), node);
        node
    }

    /// Builds the node chain of one segment, linking neighbors with their
    /// edge lengths. Idempotent.
    fn materialize(&mut self, index: usize) {
        if self.chains[index].is_some() {
            return;
        }

        let points = self.segments[index].points.clone();
        let start_tag = self.segments[index].start_tag.clone();
        let end_tag = self.segments[index].end_tag.clone();

        let start = self.junction(&start_tag, points[0]);
        let end = self.junction(&end_tag, points[points.len() - 1]);

        let mut chain = Vec::with_capacity(points.len());
        chain.push(start);
        for point in &points[1..points.len() - 1] {
            chain.push(self.graph.add_node(RouteNode::Middle { position: *point }));
        }
        chain.push(end);

        for (pair, nodes) in points.windows(2).zip(chain.windows(2)) {
            self.graph
                .add_edge(nodes[0], nodes[1], measure_distance(&pair[0], &pair[1]));
        }

        debug!(
            "Materialized segment {index} ({start_tag:?} -> {end_tag:?}) with {} nodes",
            chain.len()
        );
        self.chains[index] = Some(chain);
    }

    /// Pulls in every sibling segment joined at the node's tag. Cached;
    /// a second traversal through the node is a no-op.
    fn expand(&mut self, node: NodeIx) {
        let tag = match &self.graph[node] {
            RouteNode::End {
                tag,
                expanded: false,
                ..
            } => tag.clone(),
            _ => return,
        };

        if let Some(joined) = self.by_tag.get(&tag).cloned() {
            for index in joined {
                self.materialize(index);
            }
        }

        if let RouteNode::End { expanded, .. } = &mut self.graph[node] {
            *expanded = true;
        }

        debug!(
            "Expanded junction {tag:?} to degree {}",
            self.graph.neighbors(node).count()
        );
    }
}
