use geo::Point;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::filter::PositionFilter;
use crate::geo::{measure_distance, project};
use crate::predict::{self, PredictionResult};
use crate::route::{RouteGraph, RouteSegment};
use crate::station::{StationArea, StationLookup};
use crate::track::cursor::Cursor;
use crate::track::search::{branch_search, BranchCandidate, BranchOutcome, Descent};

/// One geolocation fix, in the shape the location source delivers it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fix {
    pub lat: f64,
    pub lng: f64,
    /// Measured ground speed, m/s, when the sensor provides one.
    pub speed: Option<f64>,
    /// Reported accuracy radius, metres.
    pub accuracy: f64,
    /// Monotonic elapsed time, milliseconds.
    pub elapsed_ms: u64,
}

impl Fix {
    pub fn point(&self) -> Point {
        Point::new(self.lng, self.lat)
    }

    fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite() && self.accuracy.is_finite()
    }
}

/// Session tuning.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Maximum number of upcoming stations to predict.
    pub max_predictions: usize,
    /// Fixes closer than this to the last accepted one are ignored, m.
    pub gate_distance: f64,
    /// Filtered speed at which the travel direction latches, m/s.
    pub lock_speed: f64,
    /// Surface dropped (non-finite) fixes in the log instead of silently
    /// swallowing them.
    pub log_dropped_fixes: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            max_predictions: 5,
            gate_distance: 5.0,
            lock_speed: 5.0,
            log_dropped_fixes: false,
        }
    }
}

/// Ratio between the two descent sides' best distances at which the
/// search commits to one side instead of defaulting forward.
const DIRECTION_RATIO: f64 = 2.0;
/// Survivors projecting farther than this multiple of the best survivor
/// are dropped.
const SURVIVOR_PRUNE_RATIO: f64 = 2.0;

/// Live tracking of one agent along one line.
///
/// Owns the line graph, the cursor set, and the latest prediction. The
/// cursor set is replaced wholesale on every accepted fix; filter state
/// carries across generations, seeded from the first fix.
pub struct TrackingSession<L> {
    graph: RouteGraph,
    areas: Vec<StationArea>,
    lookup: L,
    filter: PositionFilter,
    config: SessionConfig,
    cursors: Vec<Cursor>,
    last_accepted: Option<Point>,
    latest: PredictionResult,
}

impl<L: StationLookup> TrackingSession<L> {
    /// Validates the line shape and opens a session.
    ///
    /// Fails fast on a malformed line; no partial session is created.
    pub fn start(
        segments: Vec<RouteSegment>,
        areas: Vec<StationArea>,
        lookup: L,
        config: SessionConfig,
    ) -> crate::Result<TrackingSession<L>> {
        let graph = RouteGraph::new(segments)?;

        Ok(TrackingSession {
            graph,
            areas,
            lookup,
            filter: PositionFilter::default(),
            config,
            cursors: Vec::new(),
            last_accepted: None,
            latest: PredictionResult::default(),
        })
    }

    /// Latest prediction, as observed by downstream consumers.
    pub fn latest(&self) -> &PredictionResult {
        &self.latest
    }

    /// Current position hypotheses.
    pub fn cursors(&self) -> &[Cursor] {
        &self.cursors
    }

    /// The line graph, for resolving cursor node handles to positions.
    pub fn graph(&self) -> &RouteGraph {
        &self.graph
    }

    /// Feeds one fix through the tracker and returns the latest
    /// prediction.
    ///
    /// Never fails: malformed input and lookup misses degrade to the
    /// previous (or an empty) result.
    pub fn on_fix(&mut self, fix: Fix) -> PredictionResult {
        if !fix.is_finite() {
            if self.config.log_dropped_fixes {
                warn!("Dropping non-finite fix at {}ms", fix.elapsed_ms);
            }
            return self.latest.clone();
        }

        let point = fix.point();

        if self.cursors.is_empty() {
            return self.anchor(fix, point);
        }

        // Noise gate: a fix within a few metres of the last accepted one
        // carries no usable motion signal.
        if let Some(last) = self.last_accepted {
            if measure_distance(&last, &point) < self.config.gate_distance {
                return self.latest.clone();
            }
        }

        let previous = std::mem::take(&mut self.cursors);
        let mut survivors: Vec<Cursor> = Vec::new();

        for cursor in &previous {
            let forward = branch_search(&mut self.graph, cursor, &point, Descent::Forward);
            let backward = branch_search(&mut self.graph, cursor, &point, Descent::Backward);

            for candidate in Self::commit_direction(forward, backward).candidates {
                survivors.push(self.advance(cursor, candidate, &fix));
            }
        }

        if survivors.len() > 1 {
            let best = survivors
                .iter()
                .map(|cursor| cursor.projection.distance)
                .fold(f64::INFINITY, f64::min);
            survivors.retain(|cursor| cursor.projection.distance <= SURVIVOR_PRUNE_RATIO * best);
        }

        debug!(
            "{} -> {} cursors at {}ms",
            previous.len(),
            survivors.len(),
            fix.elapsed_ms
        );

        self.cursors = survivors;
        self.last_accepted = Some(point);
        self.refresh_prediction();
        self.latest.clone()
    }

    /// Ends the session, tearing the graph arena down.
    ///
    /// Consumes the session, so a release can never race an in-flight
    /// [`on_fix`](TrackingSession::on_fix).
    pub fn release(mut self) {
        self.cursors.clear();
        self.graph.release();
    }

    /// First accepted fix: anchor one cursor on the globally nearest
    /// projection and seed its filter. Emits an empty prediction.
    fn anchor(&mut self, fix: Fix, point: Point) -> PredictionResult {
        let Some(anchor) = self.graph.nearest_projection(&point) else {
            if self.config.log_dropped_fixes {
                warn!("No line shape to anchor on at {}ms", fix.elapsed_ms);
            }
            return self.latest.clone();
        };

        let measured = anchor.projection.fraction * anchor.projection.edge_length;
        let state = self
            .filter
            .initialize(fix.elapsed_ms, measured, fix.speed, fix.accuracy);

        debug!(
            "Anchored at {:?} ({}m off the line)",
            anchor.projection.point, anchor.projection.distance
        );

        self.cursors = vec![Cursor {
            edge_start: anchor.edge_start,
            edge_end: anchor.edge_end,
            projection: anchor.projection,
            direction: 1,
            path_offset: 0.0,
            state,
            direction_locked: false,
        }];
        self.last_accepted = Some(point);
        self.latest = PredictionResult::default();
        self.latest.clone()
    }

    /// Picks which descent side's candidates survive.
    ///
    /// Only a clear margin commits to one side; comparable distances
    /// default to the forward list, discarding the backward candidates
    /// (see DESIGN.md on this asymmetry).
    fn commit_direction(forward: BranchOutcome, backward: BranchOutcome) -> BranchOutcome {
        let near = forward.best_distance.min(backward.best_distance);
        let far = forward.best_distance.max(backward.best_distance);

        if far >= DIRECTION_RATIO * near && backward.best_distance < forward.best_distance {
            backward
        } else {
            forward
        }
    }

    /// Filters a surviving candidate and resolves its travel direction.
    fn advance(&self, cursor: &Cursor, candidate: BranchCandidate, fix: &Fix) -> Cursor {
        let state = self.filter.update(
            &cursor.state,
            candidate.measured_position(),
            fix.accuracy,
            fix.elapsed_ms,
        );

        let mut next = Cursor {
            edge_start: candidate.edge_start,
            edge_end: candidate.edge_end,
            projection: candidate.projection,
            direction: cursor.direction,
            path_offset: candidate.path_offset,
            state,
            direction_locked: cursor.direction_locked,
        };

        self.resolve_direction(&mut next, fix);
        next
    }

    /// Direction-of-travel bookkeeping against the freshly filtered
    /// velocity.
    ///
    /// Unlocked cursors follow the velocity's sign cheaply and latch once
    /// the speed clears the lock threshold. A locked cursor that
    /// disagrees with its velocity has genuinely turned around: the edge
    /// is swapped, the projection recomputed against the swapped edge,
    /// and the axis re-anchored so the position stays continuous at the
    /// reversal point. The lock itself is never cleared.
    fn resolve_direction(&self, cursor: &mut Cursor, fix: &Fix) {
        let velocity = cursor.state.velocity;

        if !cursor.direction_locked {
            if velocity < 0.0 {
                cursor.direction = -1;
            } else if velocity > 0.0 {
                cursor.direction = 1;
            }

            if velocity.abs() > self.config.lock_speed {
                cursor.direction_locked = true;
            }
            return;
        }

        let agrees = velocity == 0.0 || (velocity > 0.0) == (cursor.direction > 0);
        if agrees {
            return;
        }

        if cursor.direction > 0 {
            // The axis itself must flip: the agent moves toward
            // edge_start.
            std::mem::swap(&mut cursor.edge_start, &mut cursor.edge_end);

            let start = self.graph.position(cursor.edge_start);
            let end = self.graph.position(cursor.edge_end);
            cursor.projection = project(&fix.point(), &start, &end);

            cursor.state.velocity = -cursor.state.velocity;
            cursor.path_offset =
                cursor.state.position - cursor.projection.fraction * cursor.projection.edge_length;
        }
        // Either way the axis now runs along the travel direction.
        cursor.direction = 1;

        debug!("Structural reversal at {}ms", fix.elapsed_ms);
    }

    /// Rebuilds the latest prediction from the surviving cursor set.
    fn refresh_prediction(&mut self) {
        let TrackingSession {
            graph,
            areas,
            lookup,
            cursors,
            config,
            latest,
            ..
        } = self;

        *latest = predict::predict(graph, cursors, areas, &*lookup, config.max_predictions);
    }
}
