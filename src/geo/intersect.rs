use geo::Point;

/// Intersects the segments `(a1, a2)` and `(b1, b2)` in the lng/lat plane.
///
/// Standard 2-D parametric intersection treating lng as x and lat as y.
/// Returns `None` for parallel segments and for intersections falling
/// outside the `[0, 1] x [0, 1]` parameter range.
pub fn segment_intersection(a1: &Point, a2: &Point, b1: &Point, b2: &Point) -> Option<Point> {
    let (adx, ady) = (a2.x() - a1.x(), a2.y() - a1.y());
    let (bdx, bdy) = (b2.x() - b1.x(), b2.y() - b1.y());

    let denominator = adx * bdy - ady * bdx;
    if denominator == 0.0 {
        return None;
    }

    let (sx, sy) = (b1.x() - a1.x(), b1.y() - a1.y());
    let t = (sx * bdy - sy * bdx) / denominator;
    let u = (sx * ady - sy * adx) / denominator;

    if !(0.0..=1.0).contains(&t) || !(0.0..=1.0).contains(&u) {
        return None;
    }

    Some(Point::new(a1.x() + adx * t, a1.y() + ady * t))
}
