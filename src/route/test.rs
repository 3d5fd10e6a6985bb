use geo::Point;

use crate::geo::LatLng;
use crate::route::{ConstructionError, RouteGraph, RouteSegment};

fn seg(points: &[(f64, f64)], start: &str, end: &str) -> RouteSegment {
    RouteSegment::new(
        points.iter().map(|(lat, lng)| LatLng::new(*lat, *lng)),
        start,
        end,
    )
}

/// A three-way junction "J": straight run A-J-B plus a branch J-C.
fn three_way() -> Vec<RouteSegment> {
    vec![
        seg(&[(0.0, 0.0), (0.0, 0.001)], "A", "J"),
        seg(&[(0.0, 0.001), (0.0, 0.002)], "J", "B"),
        seg(&[(0.0, 0.001), (0.001, 0.001)], "J", "C"),
    ]
}

#[test]
fn short_segment_rejected() {
    let result = RouteGraph::new(vec![seg(&[(0.0, 0.0)], "A", "B")]);
    assert_eq!(result.err(), Some(ConstructionError::ShortSegment { index: 0 }));
}

#[test]
fn dangling_tag_rejected() {
    let result = RouteGraph::new(vec![seg(&[(0.0, 0.0), (0.0, 0.001)], "", "B")]);
    assert_eq!(result.err(), Some(ConstructionError::DanglingTag { index: 0 }));
}

#[test]
fn non_finite_coordinate_rejected() {
    let result = RouteGraph::new(vec![seg(&[(0.0, f64::NAN), (0.0, 0.001)], "A", "B")]);
    assert_eq!(
        result.err(),
        Some(ConstructionError::InvalidCoordinate { index: 0 })
    );
}

#[test]
fn overfull_junction_rejected() {
    let mut segments = three_way();
    segments.push(seg(&[(0.0, 0.001), (-0.001, 0.001)], "J", "D"));

    match RouteGraph::new(segments) {
        Err(ConstructionError::JunctionDegree { tag, degree }) => {
            assert_eq!(tag, "J");
            assert_eq!(degree, 4);
        }
        other => panic!("expected a junction degree error, got {other:?}"),
    }
}

#[test]
fn construction_is_lazy() {
    let graph = RouteGraph::new(three_way()).unwrap();
    assert_eq!(graph.node_count(), 0);
}

#[test]
fn anchoring_materializes_only_the_winning_segment() {
    let mut graph = RouteGraph::new(three_way()).unwrap();

    let anchor = graph
        .nearest_projection(&Point::new(0.0005, 0.00001))
        .expect("anchor on segment A-J");

    // Only the A-J chain exists so far; the junction is untouched.
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.expanded("J"), Some(false));
    assert!((graph.position(anchor.edge_start).x() - 0.0).abs() < 1e-12);
    assert!((graph.position(anchor.edge_end).x() - 0.001).abs() < 1e-12);
}

#[test_log::test]
fn traversal_expands_junction_exactly_once() {
    let mut graph = RouteGraph::new(three_way()).unwrap();

    let anchor = graph
        .nearest_projection(&Point::new(0.0005, 0.00001))
        .expect("anchor on segment A-J");

    let onward = graph.onward(anchor.edge_end, anchor.edge_start);

    // Expansion pulled in both sibling segments: B straight ahead (kept),
    // C perpendicular (kept, zero dot product), A retained as the
    // reversal candidate.
    assert_eq!(graph.expanded("J"), Some(true));
    assert_eq!(graph.degree(anchor.edge_end), 3);
    assert_eq!(onward.len(), 3);

    // Re-traversal is cached: same neighbors, no new nodes.
    let nodes = graph.node_count();
    let again = graph.onward(anchor.edge_end, anchor.edge_start);
    assert_eq!(graph.node_count(), nodes);
    assert_eq!(again.len(), 3);
}

#[test]
fn backtracking_neighbors_excluded() {
    // The branch at J doubles back west, against the A -> J arrival.
    let segments = vec![
        seg(&[(0.0, 0.0), (0.0, 0.001)], "A", "J"),
        seg(&[(0.0, 0.001), (0.0005, 0.0002)], "J", "D"),
    ];
    let mut graph = RouteGraph::new(segments).unwrap();

    let anchor = graph
        .nearest_projection(&Point::new(0.0005, 0.00001))
        .expect("anchor on segment A-J");
    let onward = graph.onward(anchor.edge_end, anchor.edge_start);

    // D is behind the arrival direction; only the reversal candidate
    // (A itself) remains.
    assert_eq!(onward.len(), 1);
    assert_eq!(onward[0], anchor.edge_start);
}

#[test]
fn middle_node_yields_exactly_the_other_neighbor() {
    let segments = vec![seg(&[(0.0, 0.0), (0.0, 0.001), (0.0, 0.002)], "A", "B")];
    let mut graph = RouteGraph::new(segments).unwrap();

    let anchor = graph
        .nearest_projection(&Point::new(0.0004, 0.0))
        .expect("anchor on first edge");

    let middle = anchor.edge_end;
    assert!(!graph.node(middle).is_end());
    assert_eq!(graph.degree(middle), 2);

    let onward = graph.onward(middle, anchor.edge_start);
    assert_eq!(onward.len(), 1);
    assert!((graph.position(onward[0]).x() - 0.002).abs() < 1e-12);
}

#[test]
fn nearest_projection_is_global() {
    let segments = vec![
        seg(&[(0.0, 0.0), (0.0, 0.001)], "A", "B"),
        seg(&[(0.01, 0.0), (0.01, 0.001)], "C", "D"),
    ];
    let mut graph = RouteGraph::new(segments).unwrap();

    let anchor = graph
        .nearest_projection(&Point::new(0.0006, 0.0101))
        .expect("anchor somewhere");

    // The distant northern segment wins.
    assert!((graph.position(anchor.edge_start).y() - 0.01).abs() < 1e-12);
    assert!((anchor.projection.fraction - 0.6).abs() < 1e-6);
}

#[test]
fn release_clears_the_arena() {
    let mut graph = RouteGraph::new(three_way()).unwrap();
    let anchor = graph.nearest_projection(&Point::new(0.0005, 0.0)).unwrap();
    graph.onward(anchor.edge_end, anchor.edge_start);
    assert!(graph.node_count() > 0);

    graph.release();
    assert_eq!(graph.node_count(), 0);
    assert_eq!(graph.expanded("J"), None);
}
