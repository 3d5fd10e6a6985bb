//! Upcoming-station prediction.
//!
//! Walks the line graph forward of each surviving cursor, detecting
//! where the travel path crosses out of the current station's catchment
//! boundary, and folds every branch and cursor into one deduplicated,
//! distance-sorted list.


use geo::Point;
use itertools::Itertools;
use log::warn;
use rustc_hash::FxHashMap;

use crate::geo::{measure_distance, segment_intersection};
use crate::route::{NodeIx, RouteGraph};
use crate::station::{Station, StationArea, StationId, StationLookup};
use crate::track::Cursor;

/// One upcoming station with its distance along the travelled path.
#[derive(Clone, Debug, PartialEq)]
pub struct StationPrediction {
    pub station: Station,
    /// Metres along the walked path to the station's boundary.
    pub distance: f64,
}

/// Latest prediction observed by downstream consumers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PredictionResult {
    pub current_station: Option<Station>,
    /// Distance-ascending, station-unique, at most the configured count.
    pub stations_ahead: Vec<StationPrediction>,
}

/// Abort threshold for one cursor's forward walk. Densely cyclic shapes
/// could otherwise keep a crossing-free walk alive indefinitely.
const MAX_WALK_STEPS: usize = 1000;

/// Metres stepped past a boundary crossing before resolving the entering
/// station; a lookup exactly on the boundary would be ambiguous.
const CROSSING_STEP: f64 = 0.5;

/// Predicts the stations ahead of every surviving cursor.
///
/// Lookup misses and guard trips shrink the result; they never fail it.
pub fn predict<L: StationLookup>(
    graph: &mut RouteGraph,
    cursors: &[Cursor],
    areas: &[StationArea],
    lookup: &L,
    max_count: usize,
) -> PredictionResult {
    let by_station: FxHashMap<StationId, &StationArea> = areas
        .iter()
        .map(|area| (area.station.id, area))
        .collect();

    let best = cursors
        .iter()
        .min_by(|a, b| a.projection.distance.total_cmp(&b.projection.distance));
    let current_station = best
        .and_then(|cursor| lookup.nearest(&cursor.projection.point))
        .cloned();

    let mut merged: FxHashMap<StationId, StationPrediction> = FxHashMap::default();

    for cursor in cursors {
        let area = lookup
            .nearest(&cursor.projection.point)
            .and_then(|station| by_station.get(&station.id).copied());

        if let Some(area) = area {
            walk(graph, cursor, area, &by_station, lookup, max_count, &mut merged);
        }
    }

    let stations_ahead = merged
        .into_values()
        .sorted_by(|a, b| a.distance.total_cmp(&b.distance))
        .take(max_count)
        .collect();

    PredictionResult {
        current_station,
        stations_ahead,
    }
}

struct Step<'a> {
    /// Where on the current edge the walk stands.
    from: Point,
    /// Far node the walk is heading toward.
    node: NodeIx,
    previous: NodeIx,
    /// Metres walked to `from`.
    travelled: f64,
    area: &'a StationArea,
    /// Station budget left on this branch.
    remaining: usize,
}

/// Forward walk of one cursor, accumulating crossings into `merged`.
///
/// A junction fans into one step per onward neighbor without consuming
/// budget; only boundary crossings decrement it.
fn walk<'a, L: StationLookup>(
    graph: &mut RouteGraph,
    cursor: &Cursor,
    start_area: &'a StationArea,
    by_station: &FxHashMap<StationId, &'a StationArea>,
    lookup: &L,
    max_count: usize,
    merged: &mut FxHashMap<StationId, StationPrediction>,
) {
    if max_count == 0 {
        return;
    }

    let mut stack = vec![Step {
        from: cursor.projection.point,
        node: cursor.ahead(),
        previous: cursor.behind(),
        travelled: 0.0,
        area: start_area,
        remaining: max_count,
    }];

    let mut steps = 0usize;

    while let Some(step) = stack.pop() {
        steps += 1;
        if steps > MAX_WALK_STEPS {
            warn!("Aborting prediction walk after {MAX_WALK_STEPS} steps, result is partial");
            return;
        }

        let far = graph.position(step.node);

        if leaves_area(step.area, &far, lookup) {
            let crossing = step
                .area
                .edges()
                .filter_map(|(b1, b2)| segment_intersection(&step.from, &far, b1, b2))
                .min_by(|a, b| {
                    measure_distance(&step.from, a).total_cmp(&measure_distance(&step.from, b))
                });

            if let Some(crossing) = crossing {
                let travelled = step.travelled + measure_distance(&step.from, &crossing);
                let probe = step_past(&step.from, &far, &crossing, CROSSING_STEP);
                let probe_travelled = travelled + measure_distance(&crossing, &probe);

                // A crossing the lookup cannot attribute ends the branch
                // quietly: we know the agent left, but not into whose
                // area.
                let Some(entered) = lookup.nearest(&probe) else {
                    continue;
                };

                if entered.id == step.area.station.id {
                    // Crossed back into the current catchment; no
                    // station change, keep walking from past the
                    // boundary.
                    stack.push(Step {
                        from: probe,
                        travelled: probe_travelled,
                        ..step
                    });
                    continue;
                }

                record(merged, entered, travelled);

                if step.remaining > 1 {
                    if let Some(&next_area) = by_station.get(&entered.id) {
                        stack.push(Step {
                            from: probe,
                            travelled: probe_travelled,
                            area: next_area,
                            remaining: step.remaining - 1,
                            ..step
                        });
                    }
                }
                continue;
            }
            // The endpoint reads as outside but no boundary edge crosses
            // the travel edge; keep walking.
        }

        let travelled = step.travelled + measure_distance(&step.from, &far);
        for neighbor in graph.onward(step.node, step.previous) {
            stack.push(Step {
                from: far,
                node: neighbor,
                previous: step.node,
                travelled,
                area: step.area,
                remaining: step.remaining,
            });
        }
    }
}

/// Whether `point` has left `area`.
///
/// A closed ring decides by membership; an open polyline bounds no
/// interior, so the nearest-station identity decides instead.
fn leaves_area<L: StationLookup>(area: &StationArea, point: &Point, lookup: &L) -> bool {
    if area.closed() {
        !area.contains(point)
    } else {
        lookup
            .nearest(point)
            .is_some_and(|station| station.id != area.station.id)
    }
}

/// Steps `metres` past `crossing` along the `from -> toward` direction.
fn step_past(from: &Point, toward: &Point, crossing: &Point, metres: f64) -> Point {
    let length = measure_distance(from, toward);
    if length == 0.0 {
        return *crossing;
    }

    let t = metres / length;
    Point::new(
        crossing.x() + (toward.x() - from.x()) * t,
        crossing.y() + (toward.y() - from.y()) * t,
    )
}

/// Keeps the minimum distance per station across branches and cursors.
fn record(merged: &mut FxHashMap<StationId, StationPrediction>, station: &Station, distance: f64) {
    merged
        .entry(station.id)
        .and_modify(|held| held.distance = held.distance.min(distance))
        .or_insert_with(|| StationPrediction {
            station: station.clone(),
            distance,
        });
}
