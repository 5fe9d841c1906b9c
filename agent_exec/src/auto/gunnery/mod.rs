//! # Gunnery module
//!
//! Gunnery is responsible for laying the turret on the tracked target and
//! deciding when to fire. Bearing is acquired first by rotating the turret
//! ring, then the barrel is elevated to the angle an empirical range
//! regression demands, and only when both are within tolerance is a shot
//! released. The progression is modelled as an explicit state machine:
//!
//! - `AcquiringBearing` - rotating the turret onto the target azimuth
//! - `AcquiringElevation` - driving the barrel to the computed elevation
//! - `ReadyToFire` - both within tolerance, firing
//!
//! Any cycle in which the target leaves the effective range band, or the
//! bearing drifts out of tolerance, drops the machine back to
//! `AcquiringBearing`.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod ballistics;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use ballistics::BallisticModel;
pub use params::{BallisticParams, Params};
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during Gunnery operation.
#[derive(Debug, thiserror::Error)]
pub enum GunneryError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Parameter file contains a non-finite tunable: {0}")]
    NonFiniteParam(&'static str),

    #[error("Could not initialise the status report archiver: {0}")]
    ArchInitError(String),

    /// The target is outside the band of ranges the gun can reach. The
    /// caller must not attempt a shot, but bearing tracking continues.
    #[error("Range {0:.3} m is outside the effective band")]
    OutOfRange(f64),

    /// Inverting the range regression produced a negative discriminant, the
    /// regression has no real solution at this range.
    #[error("Range regression has no real solution at {0:.3} m")]
    NegativeDiscriminant(f64),

    /// The inverted regression produced an elevation outside the physical
    /// bracket of the barrel. Out-of-bracket results are rejected, never
    /// silently clamped.
    #[error("Computed barrel angle {0:.3} deg is outside the physical bracket")]
    AngleOutsideBracket(f64),
}
