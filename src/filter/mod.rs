//! 1-D recursive state estimation along the line.
//!
//! A cursor measures its position as a single scalar, metres along its
//! path axis. The filter smooths that scalar with a constant-velocity
//! Kalman recursion so that GPS jitter damps out over a handful of fixes
//! and the velocity estimate settles quickly enough to resolve the
//! direction of travel.


/// Filtered 1-D estimate carried by a cursor across fix generations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrackState {
    /// Metres along the cursor's path axis.
    pub position: f64,
    /// Metres per second along the axis; negative means the agent moves
    /// against the cursor's edge orientation.
    pub velocity: f64,
    pub covariance: Covariance,
    /// Monotonic elapsed time of the producing fix, in milliseconds.
    pub elapsed_ms: u64,
}

/// Symmetric 2x2 covariance of (position, velocity).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Covariance {
    pub pp: f64,
    pub pv: f64,
    pub vv: f64,
}

/// Constant-velocity filter tuning.
///
/// The defaults damp typical GPS jitter (5-15 m accuracy at ~1 Hz) over
/// roughly 5-10 s of fixes while still following real speed changes of a
/// rail vehicle.
#[derive(Clone, Copy, Debug)]
pub struct PositionFilter {
    /// White-noise acceleration density, m/s^2.
    pub accel_sigma: f64,
    /// Velocity deviation seeded when the first fix carries no speed.
    pub initial_velocity_sigma: f64,
    /// Floor applied to reported accuracies before weighting, metres.
    pub accuracy_floor: f64,
}

impl Default for PositionFilter {
    fn default() -> Self {
        PositionFilter {
            accel_sigma: 0.6,
            initial_velocity_sigma: 8.0,
            accuracy_floor: 1.0,
        }
    }
}

impl PositionFilter {
    /// Seeds a state from the first accepted fix.
    pub fn initialize(
        &self,
        elapsed_ms: u64,
        position: f64,
        speed: Option<f64>,
        accuracy: f64,
    ) -> TrackState {
        let accuracy = accuracy.max(self.accuracy_floor);
        let velocity_variance = match speed {
            // A measured speed is trusted to roughly walking-pace error.
            Some(_) => 1.0,
            None => self.initial_velocity_sigma * self.initial_velocity_sigma,
        };

        TrackState {
            position,
            velocity: speed.unwrap_or(0.0),
            covariance: Covariance {
                pp: accuracy * accuracy,
                pv: 0.0,
                vv: velocity_variance,
            },
            elapsed_ms,
        }
    }

    /// One predict/correct cycle against a measured 1-D position.
    ///
    /// The prior is advanced by its own velocity over the elapsed time,
    /// then corrected by the measurement weighted inversely with
    /// `accuracy` squared.
    pub fn update(
        &self,
        prior: &TrackState,
        measured_position: f64,
        accuracy: f64,
        elapsed_ms: u64,
    ) -> TrackState {
        let dt = elapsed_ms.saturating_sub(prior.elapsed_ms) as f64 / 1000.0;
        let q = self.accel_sigma * self.accel_sigma;

        // Predict.
        let predicted = prior.position + prior.velocity * dt;
        let Covariance { pp, pv, vv } = prior.covariance;
        let pp = pp + 2.0 * dt * pv + dt * dt * vv + q * dt.powi(4) / 4.0;
        let pv = pv + dt * vv + q * dt.powi(3) / 2.0;
        let vv = vv + q * dt * dt;

        // Correct.
        let accuracy = accuracy.max(self.accuracy_floor);
        let innovation = measured_position - predicted;
        let gate = pp + accuracy * accuracy;
        let gain_position = pp / gate;
        let gain_velocity = pv / gate;

        TrackState {
            position: predicted + gain_position * innovation,
            velocity: prior.velocity + gain_velocity * innovation,
            covariance: Covariance {
                pp: (1.0 - gain_position) * pp,
                pv: (1.0 - gain_position) * pv,
                vv: vv - gain_velocity * pv,
            },
            elapsed_ms,
        }
    }
}
