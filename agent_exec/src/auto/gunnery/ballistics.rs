//! # Ballistic model
//!
//! Inverts the empirical range regression to recover the barrel elevation
//! needed to land a shot at a given range. The regression
//! `range = a*angle^2 + b*angle + c` was fitted from test-fire data with the
//! angle in degrees; the inversion takes the positive quadratic root and
//! validates it against the barrel's physical bracket before converting to
//! radians.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use util::maths::poly_val;

use super::{BallisticParams, GunneryError};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Slack applied to the bracket check, so angles sitting exactly on the
/// bracket edge are not rejected by floating point noise.
const BRACKET_EPSILON_DEG: f64 = 1e-6;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The ballistic model of the gun.
#[derive(Debug, Clone, Default)]
pub struct BallisticModel {
    params: BallisticParams,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl BallisticModel {
    pub fn new(params: BallisticParams) -> Self {
        Self { params }
    }

    /// True if the given range lies inside the effective band of the gun.
    pub fn range_in_band(&self, range_m: f64) -> bool {
        range_m >= self.params.effective_min_range_m
            && range_m <= self.params.effective_max_range_m
    }

    /// The barrel elevation needed to land a shot at the given range, in
    /// radians.
    ///
    /// Only defined inside the effective range band. The discriminant of the
    /// inverted regression must be non-negative and the resulting angle must
    /// lie within the physical bracket of the barrel, anything else is a
    /// domain error for this cycle, never a panic.
    pub fn barrel_angle_for_range(&self, range_m: f64) -> Result<f64, GunneryError> {
        if !self.range_in_band(range_m) {
            return Err(GunneryError::OutOfRange(range_m));
        }

        let [a, b, c] = self.params.regression_coeffs;

        let discriminant = b * b - 4.0 * a * (c - range_m);
        if discriminant < 0.0 {
            return Err(GunneryError::NegativeDiscriminant(range_m));
        }

        let angle_deg = (-b + discriminant.sqrt()) / (2.0 * a);

        if angle_deg < self.params.barrel_bracket_min_deg - BRACKET_EPSILON_DEG
            || angle_deg > self.params.barrel_bracket_max_deg + BRACKET_EPSILON_DEG
        {
            return Err(GunneryError::AngleOutsideBracket(angle_deg));
        }

        Ok(angle_deg.to_radians())
    }

    /// The forward regression: the range a shot at the given elevation will
    /// land at, in meters.
    pub fn range_for_angle(&self, angle_rad: f64) -> f64 {
        poly_val(&angle_rad.to_degrees(), &self.params.regression_coeffs)
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn model() -> BallisticModel {
        BallisticModel::new(BallisticParams {
            regression_coeffs: [0.373, 5.914, 41.24],
            effective_min_range_m: 21.002,
            effective_max_range_m: 115.8,
            barrel_bracket_min_deg: -5.0,
            barrel_bracket_max_deg: 10.0,
        })
    }

    #[test]
    fn test_inversion_round_trips_forward_regression() {
        let model = model();

        // The range the regression predicts for a 5 degree elevation must
        // invert back to 5 degrees
        let range_m = model.range_for_angle(5f64.to_radians());
        let angle_rad = model.barrel_angle_for_range(range_m).unwrap();

        assert!((angle_rad.to_degrees() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_band_rejected() {
        let model = model();

        assert!(matches!(
            model.barrel_angle_for_range(20.0),
            Err(GunneryError::OutOfRange(_))
        ));
        assert!(matches!(
            model.barrel_angle_for_range(200.0),
            Err(GunneryError::OutOfRange(_))
        ));

        // The band edges themselves are valid
        assert!(model.barrel_angle_for_range(21.002).is_ok());
        assert!(model.barrel_angle_for_range(115.8).is_ok());
    }

    #[test]
    fn test_angle_outside_bracket_rejected() {
        // A deliberately narrow bracket rejects the otherwise valid solution
        let model = BallisticModel::new(BallisticParams {
            regression_coeffs: [0.373, 5.914, 41.24],
            effective_min_range_m: 21.002,
            effective_max_range_m: 115.8,
            barrel_bracket_min_deg: -5.0,
            barrel_bracket_max_deg: 2.0,
        });

        // 100 m needs roughly 7 degrees, outside the 2 degree bracket
        assert!(matches!(
            model.barrel_angle_for_range(100.0),
            Err(GunneryError::AngleOutsideBracket(_))
        ));
    }

    #[test]
    fn test_negative_discriminant_rejected() {
        // An upside-down regression whose vertex is below the requested range
        let model = BallisticModel::new(BallisticParams {
            regression_coeffs: [-1.0, 0.0, 50.0],
            effective_min_range_m: 21.002,
            effective_max_range_m: 115.8,
            barrel_bracket_min_deg: -90.0,
            barrel_bracket_max_deg: 90.0,
        });

        assert!(matches!(
            model.barrel_angle_for_range(100.0),
            Err(GunneryError::NegativeDiscriminant(_))
        ));
    }
}
