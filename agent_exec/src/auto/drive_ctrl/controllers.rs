//! # Drive controllers module
//!
//! This module provides the PID controller used by DriveCtrl for heading
//! correction.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Floor applied to the timestep to keep the derivative term finite when two
/// updates arrive almost simultaneously.
const MIN_DT_S: f64 = 0.01;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A PID controller
#[derive(Debug, Default, Serialize, Clone)]
pub struct PidController {
    /// Proportional gain
    k_p: f64,

    /// Integral gain
    k_i: f64,

    /// Dervative gain
    k_d: f64,

    /// The integral accumulation, clamped to +/- `integral_limit`
    integral: f64,

    /// Magnitude limit on the integral accumulation
    integral_limit: f64,

    /// Limits applied to the summed output, `(min, max)`
    output_limits: (f64, f64),

    /// Previous error
    prev_error: f64,

    /// Time of the previous update, `None` until the first update seeds it
    prev_time_s: Option<f64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PidController {
    /// Create a new controller with the given gains and limits.
    pub fn new(
        k_p: f64,
        k_i: f64,
        k_d: f64,
        integral_limit: f64,
        output_limits: (f64, f64),
    ) -> Self {
        Self {
            k_p,
            k_i,
            k_d,
            integral: 0f64,
            integral_limit,
            output_limits,
            prev_error: 0f64,
            prev_time_s: None,
        }
    }

    /// Get the value of the controller for the given error at the given time.
    ///
    /// The first call after construction (or after a reset) only seeds the
    /// clock and returns zero, there is no way to form a derivative or a
    /// meaningful integral from a single sample. Subsequent calls return the
    /// clamped sum of the three terms.
    pub fn update(&mut self, error: f64, time_s: f64) -> f64 {
        let prev_time_s = match self.prev_time_s {
            Some(t) => t,
            None => {
                self.prev_time_s = Some(time_s);
                self.prev_error = error;
                return 0f64;
            }
        };

        let dt_s = (time_s - prev_time_s).max(MIN_DT_S);

        let p = self.k_p * error;

        self.integral = (self.integral + error * dt_s)
            .clamp(-self.integral_limit, self.integral_limit);
        let i = self.k_i * self.integral;

        let d = self.k_d * (error - self.prev_error) / dt_s;

        self.prev_error = error;
        self.prev_time_s = Some(time_s);

        (p + i + d).clamp(self.output_limits.0, self.output_limits.1)
    }

    /// Clear the accumulated state, as if the controller was newly built.
    ///
    /// Called when a new route is loaded so stale integral windup from the
    /// previous route cannot leak into the new one.
    pub fn reset(&mut self) {
        self.integral = 0f64;
        self.prev_error = 0f64;
        self.prev_time_s = None;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn controller() -> PidController {
        PidController::new(0.3, 0.1, 0.05, 1.0, (-1.0, 1.0))
    }

    #[test]
    fn test_first_update_returns_zero() {
        let mut pid = controller();

        // Regardless of the error magnitude, the first sample only seeds
        assert_eq!(pid.update(100.0, 0.0), 0.0);
        assert!(pid.update(100.0, 0.1) > 0.0);
    }

    #[test]
    fn test_integral_clamped() {
        let mut pid = PidController::new(0.0, 1.0, 0.0, 1.0, (-100.0, 100.0));

        // Arbitrarily many cycles of constant-sign error never push the
        // integral term past its limit
        let mut time_s = 0.0;
        pid.update(10.0, time_s);
        for _ in 0..1000 {
            time_s += 0.1;
            let out = pid.update(10.0, time_s);
            assert!(out <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_output_clamped() {
        let mut pid = controller();

        pid.update(0.0, 0.0);
        let out = pid.update(1000.0, 0.1);
        assert_eq!(out, 1.0);

        let out = pid.update(-1000.0, 0.2);
        assert_eq!(out, -1.0);
    }

    #[test]
    fn test_dt_floored() {
        let mut pid = controller();

        pid.update(1.0, 0.0);

        // A second update at the same timestamp must not blow up the
        // derivative term
        let out = pid.update(2.0, 0.0);
        assert!(out.is_finite());
    }

    #[test]
    fn test_reset_reseeds_clock() {
        let mut pid = controller();

        pid.update(1.0, 0.0);
        pid.update(1.0, 0.1);
        pid.reset();

        assert_eq!(pid.update(50.0, 0.2), 0.0);
    }
}
