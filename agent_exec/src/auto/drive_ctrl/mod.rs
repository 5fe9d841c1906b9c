//! # Drive control module
//!
//! Drive control turns the current kinematic state and the planned route
//! into discrete movement commands. A PID controller acts on the heading
//! error to the current waypoint, and a distance-based speed profile slows
//! the hull as it closes on the waypoint. When no route can be planned the
//! module falls back to direct steering against the goal using the arrive
//! and pursuit behaviours.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod controllers;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use controllers::*;
pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during DriveCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum DriveCtrlError {
    #[error("Could not load parameters: {0}")]
    ParamLoadError(util::params::LoadError),

    #[error("Parameter file contains a non-finite tunable: {0}")]
    NonFiniteParam(&'static str),

    #[error("Could not initialise the status report archiver: {0}")]
    ArchInitError(String),

    /// A route is already loaded. This error occurs when attempting to start
    /// a new route before the current one has finished or been aborted.
    #[error("Attempted to load a route while one is already executing")]
    RouteAlreadyLoaded,

    /// Attempted to load a route with no waypoints in it.
    #[error("Attempted to load an empty route")]
    AttemptEmptyRouteLoad,
}
