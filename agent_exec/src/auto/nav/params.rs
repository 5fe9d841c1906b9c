//! Navigation parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the navigation module as a whole.
#[derive(Debug, Clone, Deserialize)]
pub struct NavParams {
    pub grid: GridParams,
    pub path_finder: PathFinderParams,
}

/// Parameters describing the occupancy grid.
#[derive(Debug, Clone, Deserialize)]
pub struct GridParams {
    /// Number of cells along the world X axis.
    pub num_cells_x: usize,

    /// Number of cells along the world Z axis.
    pub num_cells_z: usize,

    /// The size of each (square) cell in meters.
    pub cell_size_m: f64,

    /// Number of cells around an obstacle to mark as inflated.
    pub inflation_radius_cells: usize,
}

/// Parameters for the A* path finder.
#[derive(Debug, Clone, Deserialize)]
pub struct PathFinderParams {
    /// Cost of one orthogonal step between free cells.
    pub base_move_cost: u32,

    /// Additional cost of stepping onto an inflated cell.
    pub inflation_penalty: u32,
}
