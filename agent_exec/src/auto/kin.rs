//! # Kinematic state model
//!
//! Holds the position, heading and velocity of a body on the ground (X/Z)
//! plane, and integrates steering outputs into it. The world is bounded, the
//! integration hard-clamps positions to the world edges rather than
//! reflecting or raising.
//!
//! Heading convention: headings and bearings are measured with zero along the
//! world +Z axis, following the simulator's hull heading. The bearing from
//! one point to another is `atan2(dz, dx) - pi/2`, wrapped into [-pi, pi].
//! Stored headings are normalised into [0, 2pi); heading *errors* are always
//! wrapped into [-pi, pi].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use util::maths::{wrap_to_2pi, wrap_to_pi};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Position and heading of a body on the ground plane.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pose {
    /// Position in the world frame, in meters.
    pub position_m: Point2<f64>,

    /// Heading in radians, normalised to [0, 2pi).
    pub heading_rad: f64,
}

/// Full kinematic state: pose plus linear and angular velocity.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KinematicState {
    /// Position in the world frame, in meters.
    pub position_m: Point2<f64>,

    /// Heading in radians, normalised to [0, 2pi).
    pub heading_rad: f64,

    /// Velocity over the ground in meters/second.
    pub velocity_ms: Vector2<f64>,

    /// Angular rate in radians/second.
    pub rotation_rads: f64,
}

/// A steering request: a linear acceleration and an angular acceleration.
///
/// Steering outputs are transient, produced and consumed within a single
/// cycle, they are never persisted between cycles.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct SteeringOutput {
    /// Linear acceleration demand in meters/second^2.
    pub linear_mss: Vector2<f64>,

    /// Angular acceleration demand in radians/second^2.
    pub angular_radss: f64,
}

/// The rectangular extent of the traversable world.
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct WorldBounds {
    pub x_min_m: f64,
    pub x_max_m: f64,
    pub z_min_m: f64,
    pub z_max_m: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Pose {
    pub fn new(position_m: Point2<f64>, heading_rad: f64) -> Self {
        Self {
            position_m,
            heading_rad: wrap_to_2pi(heading_rad),
        }
    }
}

impl KinematicState {
    /// Build a state at rest from a pose.
    pub fn from_pose(pose: &Pose) -> Self {
        Self {
            position_m: pose.position_m,
            heading_rad: pose.heading_rad,
            velocity_ms: Vector2::zeros(),
            rotation_rads: 0.0,
        }
    }

    /// The unit vector pointing along the current heading.
    pub fn forward(&self) -> Vector2<f64> {
        let angle = self.heading_rad + std::f64::consts::FRAC_PI_2;
        Vector2::new(angle.cos(), angle.sin())
    }

    /// Integrate a steering output over `dt_s` seconds.
    ///
    /// A `None` steering is a hard stop: velocity and rotation are zeroed and
    /// the position does not change. Otherwise the velocity accumulates the
    /// linear demand and is rescaled to `max_speed_ms` if it exceeds it,
    /// preserving direction. The new position is clamped to the world bounds
    /// on each axis independently, and the heading is wrapped into [0, 2pi).
    pub fn integrate(
        &mut self,
        steering: Option<&SteeringOutput>,
        max_speed_ms: f64,
        dt_s: f64,
        bounds: &WorldBounds,
    ) {
        let steering = match steering {
            Some(s) => s,
            None => {
                self.velocity_ms = Vector2::zeros();
                self.rotation_rads = 0.0;
                return;
            }
        };

        self.velocity_ms += steering.linear_mss * dt_s;
        self.rotation_rads += steering.angular_radss * dt_s;

        let speed = self.velocity_ms.norm();
        if speed > max_speed_ms && speed > 0.0 {
            self.velocity_ms *= max_speed_ms / speed;
        }

        let new_position = self.position_m + self.velocity_ms * dt_s;
        self.position_m = Point2::new(
            new_position[0].clamp(bounds.x_min_m, bounds.x_max_m),
            new_position[1].clamp(bounds.z_min_m, bounds.z_max_m),
        );

        self.heading_rad = wrap_to_2pi(self.heading_rad + self.rotation_rads * dt_s);
    }
}

impl SteeringOutput {
    pub fn new(linear_mss: Vector2<f64>, angular_radss: f64) -> Self {
        Self {
            linear_mss,
            angular_radss,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// The bearing from one point to another, in radians wrapped to [-pi, pi].
///
/// A zero-length separation has no defined bearing and returns 0.0 rather
/// than raising.
pub fn bearing_rad(from_m: &Point2<f64>, to_m: &Point2<f64>) -> f64 {
    let direction = to_m - from_m;

    if direction.norm() == 0.0 {
        return 0.0;
    }

    wrap_to_pi(direction[1].atan2(direction[0]) - std::f64::consts::FRAC_PI_2)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
