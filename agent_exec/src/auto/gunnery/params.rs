//! Gunnery parameters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the Gunnery module
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Params {
    /// Bearing error below which the turret is considered laid on target, in
    /// radians
    pub turret_tolerance_rad: f64,

    /// Elevation error below which the barrel is considered laid, in radians
    pub barrel_tolerance_rad: f64,

    /// The ballistic model of the gun
    pub ballistics: BallisticParams,
}

/// Parameters of the empirical ballistic model.
///
/// The regression was fitted offline from test-fire data, relating the range
/// achieved to the barrel elevation set. The coefficients live here rather
/// than in the code so the gun can be recalibrated without touching control
/// logic.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BallisticParams {
    /// Coefficients `[a, b, c]` of `range = a*angle^2 + b*angle + c`, with
    /// the angle in degrees as fitted
    pub regression_coeffs: [f64; 3],

    /// Shortest range the gun can reach, in meters
    pub effective_min_range_m: f64,

    /// Longest range the gun can reach, in meters
    pub effective_max_range_m: f64,

    /// Lowest elevation the barrel can physically reach, in degrees
    pub barrel_bracket_min_deg: f64,

    /// Highest elevation the barrel can physically reach, in degrees
    pub barrel_bracket_max_deg: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Params {
    /// Check every tunable is finite.
    pub fn validate(&self) -> Result<(), &'static str> {
        let checks: [(&'static str, f64); 6] = [
            ("turret_tolerance_rad", self.turret_tolerance_rad),
            ("barrel_tolerance_rad", self.barrel_tolerance_rad),
            (
                "effective_min_range_m",
                self.ballistics.effective_min_range_m,
            ),
            (
                "effective_max_range_m",
                self.ballistics.effective_max_range_m,
            ),
            (
                "barrel_bracket_min_deg",
                self.ballistics.barrel_bracket_min_deg,
            ),
            (
                "barrel_bracket_max_deg",
                self.ballistics.barrel_bracket_max_deg,
            ),
        ];

        for (name, value) in checks.iter() {
            if !value.is_finite() {
                return Err(name);
            }
        }

        if self.ballistics.regression_coeffs.iter().any(|c| !c.is_finite()) {
            return Err("regression_coeffs");
        }

        Ok(())
    }
}
