use approx::assert_relative_eq;
use geo::Point;

use crate::geo::{measure_distance, project, segment_intersection, EARTH_EQUATORIAL_RADIUS};

// 1e-4 degrees of latitude, in metres.
fn lat_step() -> f64 {
    1e-4_f64.to_radians() * EARTH_EQUATORIAL_RADIUS
}

#[test]
fn perpendicular_foot_within_edge() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(0.0, 1e-3);
    let p = Point::new(1e-4, 5e-4);

    let projection = project(&p, &a, &b);

    assert_relative_eq!(projection.fraction, 0.5, epsilon = 1e-9);
    assert_relative_eq!(projection.distance, lat_step(), max_relative = 1e-6);
    assert_relative_eq!(projection.point.y(), 5e-4, epsilon = 1e-12);
}

#[test]
fn foot_clamped_to_near_endpoint() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(0.0, 1e-3);

    // Beyond the far endpoint, clamps to fraction 1 and measures to `b`.
    let past = Point::new(0.0, 2e-3);
    let projection = project(&past, &a, &b);
    assert_eq!(projection.fraction, 1.0);
    assert_relative_eq!(
        projection.distance,
        measure_distance(&past, &b),
        epsilon = 1e-9
    );

    // Before the start endpoint, clamps to fraction 0 and measures to `a`.
    let before = Point::new(1e-4, -1e-3);
    let projection = project(&before, &a, &b);
    assert_eq!(projection.fraction, 0.0);
    assert_relative_eq!(
        projection.distance,
        measure_distance(&before, &a),
        epsilon = 1e-9
    );
}

#[test]
fn zero_length_edge_collapses_onto_endpoint() {
    let a = Point::new(0.0, 1e-3);
    let p = Point::new(0.0, 2e-3);

    let projection = project(&p, &a, &a);

    assert_eq!(projection.fraction, 0.0);
    assert_eq!(projection.edge_length, 0.0);
    assert_relative_eq!(projection.distance, measure_distance(&p, &a), epsilon = 1e-9);
}

#[test]
fn edge_length_matches_measured_distance() {
    let a = Point::new(13.401, 52.52);
    let b = Point::new(13.405, 52.521);
    let p = Point::new(13.403, 52.5204);

    let projection = project(&p, &a, &b);

    assert_relative_eq!(
        projection.edge_length,
        measure_distance(&a, &b),
        max_relative = 1e-6
    );
}

#[test]
fn crossing_segments_intersect() {
    let intersection = segment_intersection(
        &Point::new(0.0, 0.0),
        &Point::new(1.0, 1.0),
        &Point::new(0.0, 1.0),
        &Point::new(1.0, 0.0),
    )
    .expect("segments cross");

    assert_relative_eq!(intersection.x(), 0.5, epsilon = 1e-12);
    assert_relative_eq!(intersection.y(), 0.5, epsilon = 1e-12);
}

#[test]
fn disjoint_and_parallel_segments_do_not_intersect() {
    // Lines cross outside the [0, 1] parameter range.
    assert!(segment_intersection(
        &Point::new(0.0, 0.0),
        &Point::new(1.0, 1.0),
        &Point::new(2.0, 3.0),
        &Point::new(3.0, 2.0),
    )
    .is_none());

    // Parallel.
    assert!(segment_intersection(
        &Point::new(0.0, 0.0),
        &Point::new(1.0, 0.0),
        &Point::new(0.0, 1.0),
        &Point::new(1.0, 1.0),
    )
    .is_none());
}
