//! # Navigation module
//!
//! Maintains an occupancy grid of the world from the obstacle rectangles the
//! simulator reports, and plans routes through it with an A* search. Cells
//! close to an obstacle are "inflated": traversable, but carrying a cost
//! penalty so planned routes keep a stand-off distance where they can.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod grid;
mod params;
mod path_finder;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use grid::{Cell, OccupancyGrid};
pub use params::{GridParams, NavParams, PathFinderParams};
pub use path_finder::{PathFinder, Route};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Possible errors during navigation processing.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// No traversable route exists between the start and the goal. The caller
    /// is expected to fall back to direct steering or a stop, this is a
    /// per-cycle condition, not a fatal one.
    #[error("No traversable route from the start to the goal")]
    Unreachable,
}
