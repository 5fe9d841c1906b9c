//! # Simple Navigation Test
//!
//! Builds an occupancy grid with a few stamped obstacles, plans a route
//! across it, and writes the result out as JSON for inspection.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use agent_lib::auto::nav::{GridParams, OccupancyGrid, PathFinder, PathFinderParams};
use color_eyre::Result;
use nalgebra::Point2;
use sim_if::telem::ObstacleRect;

fn main() -> Result<()> {
    color_eyre::install()?;

    // Grid matching the simulator's 300 m square arena
    let mut grid = OccupancyGrid::new(GridParams {
        num_cells_x: 300,
        num_cells_z: 300,
        cell_size_m: 1.0,
        inflation_radius_cells: 2,
    });

    // A wall with a gap, and a block near the goal
    grid.stamp_obstacle(&ObstacleRect {
        x_min_m: 50.0,
        x_max_m: 55.0,
        z_min_m: 0.0,
        z_max_m: 140.0,
    });
    grid.stamp_obstacle(&ObstacleRect {
        x_min_m: 50.0,
        x_max_m: 55.0,
        z_min_m: 160.0,
        z_max_m: 300.0,
    });
    grid.stamp_obstacle(&ObstacleRect {
        x_min_m: 200.0,
        x_max_m: 220.0,
        z_min_m: 140.0,
        z_max_m: 160.0,
    });

    let path_finder = PathFinder::new(PathFinderParams {
        base_move_cost: 10,
        inflation_penalty: 5,
    });

    let route = path_finder.find_path(
        &grid,
        &Point2::new(10.0, 150.0),
        &Point2::new(290.0, 150.0),
    )?;

    println!("Route planned with {} waypoints", route.len());

    // Save the route
    std::fs::write("nav_test_route.json", serde_json::to_string_pretty(&route)?)?;

    Ok(())
}
