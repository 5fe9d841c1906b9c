//! # Occupancy grid
//!
//! A fixed-size uniform grid over the ground plane. Cells are stamped as
//! obstacles from the rectangles the simulator reports, with an inflation
//! margin around each stamp. The grid is only ever written by obstacle
//! updates and only read during path finding.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use nalgebra::Point2;
use ndarray::Array2;
use serde::Serialize;

use sim_if::telem::ObstacleRect;

use super::GridParams;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single grid cell.
///
/// Invariant: `is_obstacle` and `is_inflated` are mutually exclusive. An
/// inflated cell is traversable but penalised; an obstacle cell is not
/// traversable at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Cell {
    pub is_obstacle: bool,
    pub is_inflated: bool,
}

/// The occupancy grid itself.
#[derive(Debug, Clone)]
pub struct OccupancyGrid {
    params: GridParams,
    cells: Array2<Cell>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl OccupancyGrid {
    /// Create a new empty grid.
    pub fn new(params: GridParams) -> Self {
        let cells = Array2::from_elem((params.num_cells_x, params.num_cells_z), Cell::default());

        Self { params, cells }
    }

    /// Number of cells along each axis, `(x, z)`.
    pub fn num_cells(&self) -> (usize, usize) {
        (self.params.num_cells_x, self.params.num_cells_z)
    }

    /// Map a world position to the cell containing it.
    ///
    /// Positions are floor-divided by the cell size and clamped into the grid
    /// extents, so positions outside the world map to the nearest edge cell.
    pub fn world_to_cell(&self, position_m: &Point2<f64>) -> (usize, usize) {
        let x = (position_m[0] / self.params.cell_size_m).floor();
        let z = (position_m[1] / self.params.cell_size_m).floor();

        (
            (x.max(0.0) as usize).min(self.params.num_cells_x - 1),
            (z.max(0.0) as usize).min(self.params.num_cells_z - 1),
        )
    }

    /// Map a cell to the world position of its centre.
    pub fn cell_to_world(&self, cell: (usize, usize)) -> Point2<f64> {
        Point2::new(
            (cell.0 as f64 + 0.5) * self.params.cell_size_m,
            (cell.1 as f64 + 0.5) * self.params.cell_size_m,
        )
    }

    /// Get the cell at the given index.
    pub fn cell(&self, cell: (usize, usize)) -> &Cell {
        &self.cells[[cell.0, cell.1]]
    }

    /// Returns true if the given world position lies in an obstacle cell.
    pub fn is_obstructed(&self, position_m: &Point2<f64>) -> bool {
        self.cell(self.world_to_cell(position_m)).is_obstacle
    }

    /// Stamp an obstacle rectangle into the grid.
    ///
    /// All cells covered by the rectangle are marked as obstacles, and cells
    /// within the inflation radius around it are marked inflated unless they
    /// are themselves obstacles. Stamps are additive and idempotent:
    /// re-stamping an identical rectangle leaves the grid unchanged.
    pub fn stamp_obstacle(&mut self, rect: &ObstacleRect) {
        let (x_min, z_min) = self.world_to_cell(&Point2::new(rect.x_min_m, rect.z_min_m));
        let (x_max, z_max) = self.world_to_cell(&Point2::new(rect.x_max_m, rect.z_max_m));

        for x in x_min..=x_max {
            for z in z_min..=z_max {
                let cell = &mut self.cells[[x, z]];
                cell.is_obstacle = true;
                cell.is_inflated = false;
            }
        }

        // Inflation margin around the stamped rectangle, skipping obstacle
        // cells so the two flags stay exclusive
        let pad = self.params.inflation_radius_cells;
        let x_lo = x_min.saturating_sub(pad);
        let x_hi = (x_max + pad).min(self.params.num_cells_x - 1);
        let z_lo = z_min.saturating_sub(pad);
        let z_hi = (z_max + pad).min(self.params.num_cells_z - 1);

        for x in x_lo..=x_hi {
            for z in z_lo..=z_hi {
                let cell = &mut self.cells[[x, z]];
                if !cell.is_obstacle {
                    cell.is_inflated = true;
                }
            }
        }
    }

    /// The 4-connected traversable neighbours of a cell.
    pub(super) fn neighbours(&self, cell: (usize, usize)) -> Vec<(usize, usize)> {
        const OFFSETS: [(i64, i64); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

        let mut neighbours = Vec::with_capacity(4);

        for (dx, dz) in OFFSETS.iter() {
            let x = cell.0 as i64 + dx;
            let z = cell.1 as i64 + dz;

            if x < 0
                || z < 0
                || x >= self.params.num_cells_x as i64
                || z >= self.params.num_cells_z as i64
            {
                continue;
            }

            let candidate = (x as usize, z as usize);
            if !self.cell(candidate).is_obstacle {
                neighbours.push(candidate);
            }
        }

        neighbours
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn params() -> GridParams {
        GridParams {
            num_cells_x: 20,
            num_cells_z: 20,
            cell_size_m: 1.0,
            inflation_radius_cells: 1,
        }
    }

    fn rect(x_min: f64, x_max: f64, z_min: f64, z_max: f64) -> ObstacleRect {
        ObstacleRect {
            x_min_m: x_min,
            x_max_m: x_max,
            z_min_m: z_min,
            z_max_m: z_max,
        }
    }

    #[test]
    fn test_world_cell_round_trip() {
        let grid = OccupancyGrid::new(params());

        for cell in &[(0usize, 0usize), (5, 7), (19, 19)] {
            let world = grid.cell_to_world(*cell);
            assert_eq!(grid.world_to_cell(&world), *cell);
        }

        // Out of bounds positions clamp to the edge cells
        assert_eq!(grid.world_to_cell(&Point2::new(-5.0, -5.0)), (0, 0));
        assert_eq!(grid.world_to_cell(&Point2::new(100.0, 100.0)), (19, 19));
    }

    #[test]
    fn test_stamp_sets_obstacle_and_inflation() {
        let mut grid = OccupancyGrid::new(params());

        grid.stamp_obstacle(&rect(5.0, 7.0, 5.0, 7.0));

        // Rectangle cells are obstacles
        assert!(grid.cell((5, 5)).is_obstacle);
        assert!(grid.cell((7, 7)).is_obstacle);
        assert!(!grid.cell((5, 5)).is_inflated);

        // The ring around the rectangle is inflated but not an obstacle
        assert!(grid.cell((4, 5)).is_inflated);
        assert!(grid.cell((8, 8)).is_inflated);
        assert!(!grid.cell((4, 5)).is_obstacle);

        // Beyond the inflation radius nothing is set
        assert_eq!(*grid.cell((3, 5)), Cell::default());
    }

    #[test]
    fn test_stamp_is_idempotent() {
        let mut once = OccupancyGrid::new(params());
        let mut twice = OccupancyGrid::new(params());

        let r = rect(5.0, 7.0, 5.0, 7.0);
        once.stamp_obstacle(&r);
        twice.stamp_obstacle(&r);
        twice.stamp_obstacle(&r);

        for x in 0..20 {
            for z in 0..20 {
                assert_eq!(once.cell((x, z)), twice.cell((x, z)));
            }
        }
    }

    #[test]
    fn test_stamp_over_inflated_cell_upgrades_to_obstacle() {
        let mut grid = OccupancyGrid::new(params());

        grid.stamp_obstacle(&rect(5.0, 5.0, 5.0, 5.0));
        assert!(grid.cell((6, 5)).is_inflated);

        // A second stamp covering the inflated cell upgrades it
        grid.stamp_obstacle(&rect(6.0, 6.0, 5.0, 5.0));
        assert!(grid.cell((6, 5)).is_obstacle);
        assert!(!grid.cell((6, 5)).is_inflated);
    }

    #[test]
    fn test_neighbours_exclude_obstacles_and_edges() {
        let mut grid = OccupancyGrid::new(params());
        grid.stamp_obstacle(&rect(1.0, 1.0, 0.0, 0.0));

        // Corner cell has two neighbours, one of which is an obstacle
        let neighbours = grid.neighbours((0, 0));
        assert_eq!(neighbours, vec![(0, 1)]);
    }
}
