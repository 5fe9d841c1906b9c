//! # Path Finder Benchmark

use criterion::{criterion_group, criterion_main, Criterion};

use agent_lib::auto::nav::{GridParams, OccupancyGrid, PathFinder, PathFinderParams};
use nalgebra::Point2;
use sim_if::telem::ObstacleRect;

fn path_finder_benchmark(c: &mut Criterion) {
    // ---- Build a grid representative of the simulator arena ----

    let mut grid = OccupancyGrid::new(GridParams {
        num_cells_x: 300,
        num_cells_z: 300,
        cell_size_m: 1.0,
        inflation_radius_cells: 2,
    });

    // Staggered walls force the search to expand a realistic frontier
    grid.stamp_obstacle(&ObstacleRect {
        x_min_m: 60.0,
        x_max_m: 65.0,
        z_min_m: 0.0,
        z_max_m: 250.0,
    });
    grid.stamp_obstacle(&ObstacleRect {
        x_min_m: 140.0,
        x_max_m: 145.0,
        z_min_m: 50.0,
        z_max_m: 300.0,
    });
    grid.stamp_obstacle(&ObstacleRect {
        x_min_m: 220.0,
        x_max_m: 225.0,
        z_min_m: 0.0,
        z_max_m: 250.0,
    });

    let path_finder = PathFinder::new(PathFinderParams {
        base_move_cost: 10,
        inflation_penalty: 5,
    });

    let start = Point2::new(10.0, 150.0);
    let goal = Point2::new(290.0, 150.0);

    c.bench_function("find_path 300x300 staggered walls", |b| {
        b.iter(|| path_finder.find_path(&grid, &start, &goal).unwrap())
    });
}

criterion_group!(benches, path_finder_benchmark);
criterion_main!(benches);
