//! Main agent-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise all modules
//!     - Main loop:
//!         - Telemetry ingest (latest snapshot, goal, obstacle updates)
//!         - Navigation processing:
//!             - Obstacle grid update
//!             - Route planning when the goal changes or the route is blocked
//!         - Drive control processing
//!         - Gunnery processing
//!         - Command publication
//!
//! The loop runs at a fixed cadence independent of the transport: if no
//! fresh snapshot has arrived by cycle time the last accepted one is reused,
//! and a failed ingest is logged and skipped for that cycle only.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use agent_lib::{
    auto::{
        drive_ctrl::DriveMode,
        gunnery,
        nav::{NavParams, OccupancyGrid, PathFinder},
    },
    data_store::DataStore,
    sim_client::SimClient,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Report};
use log::{info, warn};
use nalgebra::Point2;
use std::thread;
use std::time::{Duration, Instant};

// Internal
use sim_if::cmd::TurretCmd;
use util::{
    archive::Archived,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Target period of one cycle.
const CYCLE_PERIOD_S: f64 = 0.10;

/// Number of cycles per second
const CYCLE_FREQUENCY_HZ: f64 = 1.0 / CYCLE_PERIOD_S;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("agent_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Aegis Agent Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let nav_params: NavParams =
        util::params::load("nav.toml").wrap_err("Could not load nav params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.grid = Some(OccupancyGrid::new(nav_params.grid.clone()));
    ds.path_finder = Some(PathFinder::new(nav_params.path_finder.clone()));
    info!("Navigation init complete");

    // ---- INITIALISE MODULES ----

    ds.drive_ctrl
        .init(("drive_ctrl.toml", "steer.toml"), &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    ds.fire_ctrl
        .init("gunnery.toml", &session)
        .wrap_err("Failed to initialise Gunnery")?;
    info!("Gunnery init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE SIMULATOR BOUNDARY ----

    let sim_client = SimClient::init();
    info!("SimClient initialised");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    loop {
        // Get cycle start time
        let cycle_start_instant = Instant::now();

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start(CYCLE_FREQUENCY_HZ);

        // ---- TELEMETRY INGEST ----

        // A missing snapshot is not fatal, the loop keeps running on the last
        // accepted telemetry. Re-reading the snapshot from the previous cycle
        // is normal polling, only a timestamp regression is an anomaly.
        if let Some(snapshot) = sim_client.latest_snapshot() {
            let is_new = ds
                .telem
                .as_ref()
                .map_or(true, |t| snapshot.time_s != t.time_s);

            if is_new {
                if let Err(e) = ds.ingest_snapshot(&snapshot) {
                    warn!("Telemetry discarded: {}", e);
                }
            }
        }

        // ---- NAVIGATION PROCESSING ----

        // Stamp any new obstacles into the grid
        let mut obstacles_changed = false;
        for rect in sim_client.take_obstacle_updates() {
            if let Some(ref mut grid) = ds.grid {
                grid.stamp_obstacle(&rect);
                obstacles_changed = true;
            }
        }

        if obstacles_changed {
            info!("Obstacle grid updated");
        }

        // A goal change invalidates the current route
        let goal_m = sim_client.goal().map(|g| Point2::new(g.0, g.2));
        let mut needs_replan = ds.update_goal(goal_m);

        // A new obstacle landing on the current route also invalidates it
        if obstacles_changed && !needs_replan {
            if let (Some(ref route), Some(ref grid)) = (&ds.route, &ds.grid) {
                if route.is_blocked(grid) {
                    warn!("Current route blocked by a new obstacle");
                    needs_replan = true;
                }
            }
        }

        // Retry planning if a goal is set but nothing is executing yet, e.g.
        // because no telemetry had been accepted when the goal arrived
        if !needs_replan
            && ds.goal_m.is_some()
            && ds.route.is_none()
            && ds.drive_ctrl.mode() == DriveMode::Off
        {
            needs_replan = true;
        }

        // A grid change while steering without a route may have opened a way
        // through, try planning again
        if !needs_replan
            && obstacles_changed
            && ds.goal_m.is_some()
            && ds.drive_ctrl.mode() == DriveMode::DirectSteer
        {
            needs_replan = true;
        }

        if needs_replan {
            ds.drive_ctrl.abort();
            ds.route = None;

            if let (Some(goal_m), Some(ref telem), Some(ref grid), Some(ref path_finder)) =
                (ds.goal_m, &ds.telem, &ds.grid, &ds.path_finder)
            {
                match path_finder.find_path(grid, &telem.kin.position_m, &goal_m) {
                    Ok(route) => {
                        info!("Route planned with {} waypoints", route.len());

                        ds.route = Some(route.clone());
                        if let Err(e) = ds.drive_ctrl.set_route(route) {
                            warn!("Could not load route into DriveCtrl: {}", e);
                        }
                    }
                    Err(e) => {
                        // Unreachable goals degrade to steering straight at
                        // the goal, obstacles permitting
                        warn!("Route planning failed ({}), using direct steering", e);
                        ds.drive_ctrl.set_direct_goal(goal_m);
                    }
                }
            }
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        // DriveCtrl processing
        ds.drive_ctrl_input.kin = ds.telem.as_ref().map(|t| t.kin);
        ds.drive_ctrl_input.time_s = util::session::get_elapsed_seconds();

        match ds.drive_ctrl.proc(&ds.drive_ctrl_input) {
            Ok((cmd, report)) => {
                ds.drive_ctrl_output = cmd;
                ds.drive_ctrl_status_rpt = report;
            }
            Err(e) => {
                warn!("Error during DriveCtrl processing: {}", e);
                ds.drive_ctrl_output = sim_if::cmd::MoveCmd::stop();
            }
        }

        // Gunnery processing, only once telemetry is available
        match ds.telem {
            Some(ref telem) => {
                let input = gunnery::InputData {
                    self_pos_m: telem.kin.position_m,
                    self_heading_rad: telem.kin.heading_rad,
                    turret_elevation_rad: telem.turret_elevation_rad,
                    target_pos_m: telem.target_pos_m,
                    range_m: telem.range_m,
                };

                match ds.fire_ctrl.proc(&input) {
                    Ok((cmd, report)) => {
                        ds.fire_ctrl_output = cmd;
                        ds.fire_ctrl_status_rpt = report;
                    }
                    Err(e) => {
                        warn!("Error during Gunnery processing: {}", e);
                        ds.fire_ctrl_output = TurretCmd::none();
                    }
                }
            }
            None => {
                ds.fire_ctrl_output = TurretCmd::none();
            }
        }

        // ---- COMMAND PUBLICATION ----

        sim_client.publish_move_cmd(ds.drive_ctrl_output);
        sim_client.publish_turret_cmd(ds.fire_ctrl_output);

        // ---- WRITE ARCHIVES ----

        if let Err(e) = ds.drive_ctrl.write() {
            warn!("Could not archive DriveCtrl report: {}", e);
        }
        if let Err(e) = ds.fire_ctrl.write() {
            warn!("Could not archive Gunnery report: {}", e);
        }

        // ---- CYCLE MANAGEMENT ----

        let cycle_dur = Instant::now() - cycle_start_instant;

        // Get sleep duration
        match Duration::from_secs_f64(CYCLE_PERIOD_S).checked_sub(cycle_dur) {
            Some(d) => {
                ds.num_consec_cycle_overruns = 0;
                thread::sleep(d);
            }
            None => {
                warn!(
                    "Cycle overran by {:.06} s",
                    cycle_dur.as_secs_f64()
                        - Duration::from_secs_f64(CYCLE_PERIOD_S).as_secs_f64()
                );
                ds.num_consec_cycle_overruns += 1;
            }
        }

        // Increment cycle counter
        ds.num_cycles += 1;
    }
}
