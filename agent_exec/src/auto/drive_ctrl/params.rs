//! Drive control parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

use crate::auto::kin::WorldBounds;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the DriveCtrl module
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    /// Proportional gain of the heading controller
    pub head_k_p: f64,

    /// Integral gain of the heading controller
    pub head_k_i: f64,

    /// Derivative gain of the heading controller
    pub head_k_d: f64,

    /// Magnitude limit on the heading controller's integral accumulation
    pub head_integral_limit: f64,

    /// Minimum output of the heading controller
    pub head_output_min: f64,

    /// Maximum output of the heading controller
    pub head_output_max: f64,

    /// Distance at which the current waypoint is considered reached, in
    /// meters
    pub waypoint_tolerance_m: f64,

    /// Distance at which the speed profile begins slowing the hull, in
    /// meters. The ramp actually starts at half this radius.
    pub slow_radius_m: f64,

    /// Maximum normalised speed demand, in [0, 1]
    pub max_speed: f64,

    /// Minimum normalised speed demand, in [0, 1]
    pub min_speed: f64,

    /// Heading error above which the hull turns rather than drives, in
    /// radians
    pub angle_threshold_rad: f64,

    /// Floor applied to all emitted command weights, so a command is never a
    /// no-op actuation
    pub min_cmd_weight: f64,

    /// Maximum speed used when integrating predicted motion, in m/s
    pub kin_max_speed_ms: f64,

    /// Timestep used when integrating predicted motion, in seconds
    pub kin_dt_s: f64,

    /// The extent of the traversable world
    pub bounds: WorldBounds,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check every tunable is finite.
    ///
    /// A non-finite tunable would poison every downstream calculation with
    /// NaN, so this is a fatal startup check rather than a per-cycle one.
    pub fn validate(&self) -> Result<(), &'static str> {
        let checks: [(&'static str, f64); 13] = [
            ("head_k_p", self.head_k_p),
            ("head_k_i", self.head_k_i),
            ("head_k_d", self.head_k_d),
            ("head_integral_limit", self.head_integral_limit),
            ("head_output_min", self.head_output_min),
            ("head_output_max", self.head_output_max),
            ("waypoint_tolerance_m", self.waypoint_tolerance_m),
            ("slow_radius_m", self.slow_radius_m),
            ("max_speed", self.max_speed),
            ("min_speed", self.min_speed),
            ("angle_threshold_rad", self.angle_threshold_rad),
            ("min_cmd_weight", self.min_cmd_weight),
            ("kin_max_speed_ms", self.kin_max_speed_ms),
        ];

        for (name, value) in checks.iter() {
            if !value.is_finite() {
                return Err(name);
            }
        }

        Ok(())
    }
}
