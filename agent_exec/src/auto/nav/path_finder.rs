//! Plans routes through an [`OccupancyGrid`], using an A* algorithm.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::collections::{BinaryHeap, HashMap};

use nalgebra::Point2;
use serde::Serialize;

use super::{NavError, OccupancyGrid, PathFinderParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The route planner.
#[derive(Debug, Clone)]
pub struct PathFinder {
    params: PathFinderParams,
}

/// A planned route: an ordered sequence of waypoints from start to goal.
///
/// Waypoints are the world positions of the centres of the grid cells the
/// route passes through.
#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub waypoints_m: Vec<Point2<f64>>,
}

/// An A* search node.
///
/// The ordering is flipped so that a [`BinaryHeap`] of nodes acts as a
/// min-heap on `f_cost`. Ties in `f_cost` are broken by insertion order
/// (lower `seq` first) so that search output is deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Node {
    f_cost: u32,
    seq: u32,
    cell: (usize, usize),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl PathFinder {
    pub fn new(params: PathFinderParams) -> Self {
        Self { params }
    }

    /// Plan a route between two world positions.
    ///
    /// Start and goal are snapped to their containing cells. If either lies
    /// in an obstacle cell, or no route exists between them, the goal is
    /// unreachable: an error is returned, never a panic, and the caller is
    /// expected to degrade to direct steering or a stop.
    pub fn find_path(
        &self,
        grid: &OccupancyGrid,
        start_m: &Point2<f64>,
        goal_m: &Point2<f64>,
    ) -> Result<Route, NavError> {
        let start = grid.world_to_cell(start_m);
        let goal = grid.world_to_cell(goal_m);

        if grid.cell(start).is_obstacle || grid.cell(goal).is_obstacle {
            return Err(NavError::Unreachable);
        }

        // Open set ordered by f = g + h, with stable tie-breaking
        let mut open: BinaryHeap<Node> = BinaryHeap::new();

        let mut g_costs: HashMap<(usize, usize), u32> = HashMap::new();
        let mut parents: HashMap<(usize, usize), (usize, usize)> = HashMap::new();

        let (num_x, num_z) = grid.num_cells();
        let mut closed = vec![false; num_x * num_z];

        let mut seq = 0u32;

        g_costs.insert(start, 0);
        open.push(Node {
            f_cost: self.heuristic(start, goal),
            seq,
            cell: start,
        });

        while let Some(node) = open.pop() {
            let closed_idx = node.cell.0 * num_z + node.cell.1;
            if closed[closed_idx] {
                continue;
            }
            closed[closed_idx] = true;

            if node.cell == goal {
                return Ok(self.retrace(grid, &parents, start, goal));
            }

            let current_g = g_costs[&node.cell];

            for neighbour in grid.neighbours(node.cell) {
                if closed[neighbour.0 * num_z + neighbour.1] {
                    continue;
                }

                let mut step_cost = self.params.base_move_cost;
                if grid.cell(neighbour).is_inflated {
                    step_cost += self.params.inflation_penalty;
                }

                let tentative_g = current_g + step_cost;

                if tentative_g < *g_costs.get(&neighbour).unwrap_or(&u32::MAX) {
                    g_costs.insert(neighbour, tentative_g);
                    parents.insert(neighbour, node.cell);

                    seq += 1;
                    open.push(Node {
                        f_cost: tentative_g + self.heuristic(neighbour, goal),
                        seq,
                        cell: neighbour,
                    });
                }
            }
        }

        Err(NavError::Unreachable)
    }

    /// Manhattan distance heuristic, scaled by the base move cost.
    fn heuristic(&self, cell: (usize, usize), goal: (usize, usize)) -> u32 {
        let dx = (cell.0 as i64 - goal.0 as i64).abs() as u32;
        let dz = (cell.1 as i64 - goal.1 as i64).abs() as u32;

        (dx + dz) * self.params.base_move_cost
    }

    /// Walk the parent pointers back from the goal and reverse into a
    /// start-to-goal route of world points.
    fn retrace(
        &self,
        grid: &OccupancyGrid,
        parents: &HashMap<(usize, usize), (usize, usize)>,
        start: (usize, usize),
        goal: (usize, usize),
    ) -> Route {
        let mut cells = vec![goal];

        let mut current = goal;
        while current != start {
            // Every non-start cell on the route was reached from a parent
            current = parents[&current];
            cells.push(current);
        }

        cells.reverse();

        Route {
            waypoints_m: cells.iter().map(|c| grid.cell_to_world(*c)).collect(),
        }
    }
}

impl Route {
    /// Number of waypoints on the route.
    pub fn len(&self) -> usize {
        self.waypoints_m.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints_m.is_empty()
    }

    /// Returns true if any waypoint of the route now lies in an obstacle
    /// cell, meaning the route must be re-planned.
    pub fn is_blocked(&self, grid: &OccupancyGrid) -> bool {
        self.waypoints_m.iter().any(|wp| grid.is_obstructed(wp))
    }
}

impl Ord for Node {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        // Note that the order is flipped so that the heap is a min-heap, with
        // insertion order breaking ties
        other
            .f_cost
            .cmp(&self.f_cost)
            .then(other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for Node {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::nav::GridParams;
    use sim_if::telem::ObstacleRect;

    fn grid(inflation: usize) -> OccupancyGrid {
        OccupancyGrid::new(GridParams {
            num_cells_x: 20,
            num_cells_z: 20,
            cell_size_m: 1.0,
            inflation_radius_cells: inflation,
        })
    }

    fn finder(penalty: u32) -> PathFinder {
        PathFinder::new(PathFinderParams {
            base_move_cost: 10,
            inflation_penalty: penalty,
        })
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
    fn test_empty_grid_manhattan_route() {
        let grid = grid(1);
        let route = finder(5)
            .find_path(&grid, &Point2::new(0.5, 0.5), &Point2::new(10.5, 10.5))
            .unwrap();

        // A Manhattan distance of 20 cells gives 21 waypoints
        assert_eq!(route.len(), 21);

        // Every step moves exactly one cell orthogonally
        for pair in route.waypoints_m.windows(2) {
            let step = pair[1] - pair[0];
            assert!((step[0].abs() + step[1].abs() - 1.0).abs() < 1e-12);
        }

        // Endpooints are the cell centres of start and goal
        assert_eq!(route.waypoints_m[0], Point2::new(0.5, 0.5));
        assert_eq!(route.waypoints_m[20], Point2::new(10.5, 10.5));
    }

    #[test]
    fn test_deterministic_output() {
        let grid = grid(1);
        let f = finder(5);

        let a = f
            .find_path(&grid, &Point2::new(0.5, 0.5), &Point2::new(10.5, 10.5))
            .unwrap();
        let b = f
            .find_path(&grid, &Point2::new(0.5, 0.5), &Point2::new(10.5, 10.5))
            .unwrap();

        assert_eq!(a.waypoints_m, b.waypoints_m);
    }

    #[test]
    fn test_start_or_goal_on_obstacle_is_unreachable() {
        let mut grid = grid(0);
        grid.stamp_obstacle(&rect(5.0, 5.0, 5.0, 5.0));

        let f = finder(5);

        assert!(matches!(
            f.find_path(&grid, &Point2::new(5.5, 5.5), &Point2::new(10.5, 10.5)),
            Err(NavError::Unreachable)
        ));
        assert!(matches!(
            f.find_path(&grid, &Point2::new(0.5, 0.5), &Point2::new(5.5, 5.5)),
            Err(NavError::Unreachable)
        ));
    }

    #[test]
    fn test_walled_in_start_is_unreachable() {
        let mut grid = grid(0);

        // Box the start cell (2, 2) in on all four sides
        grid.stamp_obstacle(&rect(1.0, 3.0, 1.0, 1.0));
        grid.stamp_obstacle(&rect(1.0, 3.0, 3.0, 3.0));
        grid.stamp_obstacle(&rect(1.0, 1.0, 1.0, 3.0));
        grid.stamp_obstacle(&rect(3.0, 3.0, 1.0, 3.0));

        let result = finder(5).find_path(&grid, &Point2::new(2.5, 2.5), &Point2::new(10.5, 10.5));

        assert!(matches!(result, Err(NavError::Unreachable)));
    }

    #[test]
    fn test_high_penalty_steers_around_inflation() {
        // Obstacle at (2, 0) inflates the cells around it. The straight route
        // from (0, 1) to (4, 1) passes three inflated cells; with a high
        // penalty the detour through z = 2 is cheaper.
        let mut cheap_grid = grid(1);
        cheap_grid.stamp_obstacle(&rect(2.0, 2.0, 0.0, 0.0));

        let direct = finder(5)
            .find_path(&cheap_grid, &Point2::new(0.5, 1.5), &Point2::new(4.5, 1.5))
            .unwrap();
        assert_eq!(direct.len(), 5);

        let detour = finder(10)
            .find_path(&cheap_grid, &Point2::new(0.5, 1.5), &Point2::new(4.5, 1.5))
            .unwrap();
        assert!(detour.len() > 5);
        assert!(!detour
            .waypoints_m
            .iter()
            .any(|wp| cheap_grid.cell(cheap_grid.world_to_cell(wp)).is_inflated));
    }

    #[test]
    fn test_route_blocked_detection() {
        let mut g = grid(0);
        let route = finder(5)
            .find_path(&g, &Point2::new(0.5, 0.5), &Point2::new(10.5, 0.5))
            .unwrap();

        assert!(!route.is_blocked(&g));

        // An obstacle dropped onto the route makes it blocked
        g.stamp_obstacle(&rect(5.0, 5.0, 0.0, 0.0));
        assert!(route.is_blocked(&g));
    }
}
