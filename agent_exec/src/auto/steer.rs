//! # Steering behaviours
//!
//! Seek, arrive and pursuit behaviours. All behaviours are pure functions of
//! the character's kinematic state, the target position and the tunables,
//! they hold no state of their own.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use util::maths::{safe_normalise, wrap_to_pi};

use super::kin::{KinematicState, SteeringOutput};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Tunables for the steering behaviours.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SteerParams {
    /// Maximum linear acceleration a behaviour may demand, in m/s^2.
    pub max_acceleration_mss: f64,

    /// Maximum speed a behaviour will target, in m/s.
    pub max_speed_ms: f64,

    /// Distance at which arrival is declared, in meters.
    pub target_radius_m: f64,

    /// Distance at which deceleration begins, in meters.
    pub slow_radius_m: f64,

    /// Time over which arrive tries to achieve the target velocity, in seconds.
    pub time_to_target_s: f64,

    /// Heading error below which pursuit requests no rotation, in radians.
    pub rotation_tolerance_rad: f64,
}

/// A discrete rotation demand produced by pursuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TurnDemand {
    pub direction: TurnDirection,

    /// Normalised demand weight in [0, 1].
    pub weight: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Which way to rotate the hull.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TurnDirection {
    Left,
    Right,
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Seek: accelerate at full tilt directly towards the target.
pub fn seek(
    character: &KinematicState,
    target_m: &Point2<f64>,
    params: &SteerParams,
) -> SteeringOutput {
    let direction = safe_normalise(&(target_m - character.position_m));

    SteeringOutput::new(direction * params.max_acceleration_mss, 0.0)
}

/// Arrive: accelerate towards the target, slowing inside the slow radius.
///
/// Returns `None` once the character is within the target radius, which is
/// the signal to stop, not an error. A target exactly at the character's
/// position is treated as arrived.
pub fn arrive(
    character: &KinematicState,
    target_m: &Point2<f64>,
    params: &SteerParams,
) -> Option<SteeringOutput> {
    let direction = target_m - character.position_m;
    let distance_m = direction.norm();

    if distance_m < params.target_radius_m {
        return None;
    }

    let target_speed_ms = if distance_m > params.slow_radius_m {
        params.max_speed_ms
    } else {
        params.max_speed_ms * distance_m / params.slow_radius_m
    };

    let target_velocity_ms = safe_normalise(&direction) * target_speed_ms;

    let mut linear_mss = (target_velocity_ms - character.velocity_ms) / params.time_to_target_s;

    let accel = linear_mss.norm();
    if accel > params.max_acceleration_mss && accel > 0.0 {
        linear_mss *= params.max_acceleration_mss / accel;
    }

    Some(SteeringOutput::new(linear_mss, 0.0))
}

/// Pursuit in heading-error form: how hard to rotate towards a bearing.
///
/// Returns `None` when the heading error is inside the rotation tolerance.
/// Otherwise the demand weight ramps linearly with the error, saturating at
/// 1.0 for errors of 90 degrees or more.
pub fn pursuit(
    current_heading_rad: f64,
    target_bearing_rad: f64,
    params: &SteerParams,
) -> Option<TurnDemand> {
    let diff_rad = wrap_to_pi(target_bearing_rad - current_heading_rad);

    if diff_rad.abs() < params.rotation_tolerance_rad {
        return None;
    }

    let weight = (diff_rad.abs() / std::f64::consts::FRAC_PI_2).min(1.0);

    let direction = if diff_rad > 0.0 {
        TurnDirection::Right
    } else {
        TurnDirection::Left
    };

    Some(TurnDemand { direction, weight })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::kin::Pose;
    use nalgebra::Vector2;

    fn params() -> SteerParams {
        SteerParams {
            max_acceleration_mss: 1.0,
            max_speed_ms: 2.0,
            target_radius_m: 5.0,
            slow_radius_m: 50.0,
            time_to_target_s: 0.1,
            rotation_tolerance_rad: 0.1,
        }
    }

    fn at_rest(x: f64, z: f64) -> KinematicState {
        KinematicState::from_pose(&Pose::new(Point2::new(x, z), 0.0))
    }

    #[test]
    fn test_seek_is_full_acceleration() {
        let steering = seek(&at_rest(0.0, 0.0), &Point2::new(0.0, 10.0), &params());

        assert!((steering.linear_mss.norm() - 1.0).abs() < 1e-12);
        assert_eq!(steering.angular_radss, 0.0);
    }

    #[test]
    fn test_seek_on_top_of_target() {
        // Zero-length direction must not divide by zero
        let steering = seek(&at_rest(3.0, 3.0), &Point2::new(3.0, 3.0), &params());

        assert_eq!(steering.linear_mss, Vector2::zeros());
    }

    #[test]
    fn test_arrive_inside_target_radius() {
        let p = params();

        // Just inside the radius: no steering
        assert!(arrive(&at_rest(0.0, 0.0), &Point2::new(0.0, 5.0 - 1e-9), &p).is_none());

        // Exactly on top of the target: arrived, not a division by zero
        assert!(arrive(&at_rest(0.0, 0.0), &Point2::new(0.0, 0.0), &p).is_none());

        // Just outside: steering present and within the acceleration limit
        let steering = arrive(&at_rest(0.0, 0.0), &Point2::new(0.0, 5.0 + 1e-9), &p).unwrap();
        assert!(steering.linear_mss.norm() <= p.max_acceleration_mss + 1e-12);
    }

    #[test]
    fn test_arrive_ramps_speed_inside_slow_radius() {
        let p = SteerParams {
            // Large acceleration limit so the demand isn't clipped
            max_acceleration_mss: 1000.0,
            time_to_target_s: 1.0,
            ..params()
        };

        // At half the slow radius the target speed is half the max
        let steering = arrive(&at_rest(0.0, 0.0), &Point2::new(0.0, 25.0), &p).unwrap();
        assert!((steering.linear_mss.norm() - 1.0).abs() < 1e-9);

        // Beyond the slow radius the target speed is the max
        let steering = arrive(&at_rest(0.0, 0.0), &Point2::new(0.0, 100.0), &p).unwrap();
        assert!((steering.linear_mss.norm() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_pursuit_tolerance_and_saturation() {
        let p = params();

        // Inside the tolerance: no rotation needed
        assert!(pursuit(0.0, 0.05, &p).is_none());

        // Small error: proportional weight
        let demand = pursuit(0.0, 0.5, &p).unwrap();
        assert_eq!(demand.direction, TurnDirection::Right);
        assert!((demand.weight - 0.5 / std::f64::consts::FRAC_PI_2).abs() < 1e-12);

        // Large error: saturated at 1.0
        let demand = pursuit(0.0, 3.0, &p).unwrap();
        assert_eq!(demand.weight, 1.0);

        // Negative errors turn the other way
        let demand = pursuit(0.0, -0.5, &p).unwrap();
        assert_eq!(demand.direction, TurnDirection::Left);
    }
}
