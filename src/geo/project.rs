use geo::Point;

use crate::geo::EARTH_EQUATORIAL_RADIUS;

/// East/north offset of `target` relative to `origin`, in metres.
#[inline]
pub(crate) fn local_offset(origin: &Point, target: &Point) -> (f64, f64) {
    let scale = origin.y().to_radians().cos();
    let east = (target.x() - origin.x()).to_radians() * scale * EARTH_EQUATORIAL_RADIUS;
    let north = (target.y() - origin.y()).to_radians() * EARTH_EQUATORIAL_RADIUS;
    (east, north)
}

/// Planar-equivalent distance between two positions, in metres.
#[inline]
pub fn measure_distance(p1: &Point, p2: &Point) -> f64 {
    let (east, north) = local_offset(p1, p2);
    east.hypot(north)
}

/// The perpendicular foot of a point on one edge, with its derived
/// distances.
///
/// A foot falling outside the edge is clamped, so `fraction` is always
/// within `[0, 1]` and `distance` degrades to the distance of the nearer
/// endpoint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    /// Projected position on the edge.
    pub point: Point,
    /// Interpolation fraction from the edge start, clamped to `[0, 1]`.
    pub fraction: f64,
    /// Distance from the input point to [`point`](#structfield.point).
    pub distance: f64,
    /// Length of the projected-upon edge, in metres.
    pub edge_length: f64,
}

/// Projects `point` onto the edge `(a, b)`.
pub fn project(point: &Point, a: &Point, b: &Point) -> Projection {
    let (edge_east, edge_north) = local_offset(a, b);
    let (point_east, point_north) = local_offset(a, point);

    let length_squared = edge_east * edge_east + edge_north * edge_north;
    let fraction = if length_squared > 0.0 {
        ((point_east * edge_east + point_north * edge_north) / length_squared).clamp(0.0, 1.0)
    } else {
        // Degenerate zero-length edge, the projection collapses onto `a`.
        0.0
    };

    let projected = Point::new(
        a.x() + (b.x() - a.x()) * fraction,
        a.y() + (b.y() - a.y()) * fraction,
    );

    Projection {
        point: projected,
        fraction,
        distance: measure_distance(point, &projected),
        edge_length: length_squared.sqrt(),
    }
}
