//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use log::warn;
use nalgebra::Point2;
use serde::Serialize;

use sim_if::{
    cmd::{MoveCmd, TurretCmd},
    telem::TelemetrySnapshot,
};

use crate::auto::{
    drive_ctrl,
    gunnery,
    kin::{KinematicState, Pose},
    nav::{OccupancyGrid, PathFinder, Route},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
///
/// Every shared item lives here and has exactly one writer per cycle: the
/// ingest step writes the telemetry state, the navigation step writes the
/// grid and route, and the control modules write their own outputs.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u128,

    /// True if this cycle falls on a 1Hz boundary
    pub is_1_hz_cycle: bool,

    // Telemetry
    /// The last accepted telemetry, converted to internal units
    pub telem: Option<TelemetryState>,

    /// Number of snapshots discarded for being stale
    pub num_stale_snapshots: u64,

    // Navigation
    /// The goal position, if one has been commanded
    pub goal_m: Option<Point2<f64>>,

    /// The occupancy grid, built once navigation parameters are loaded
    pub grid: Option<OccupancyGrid>,

    /// The route planner, built once navigation parameters are loaded
    pub path_finder: Option<PathFinder>,

    /// The most recently planned route, kept for invalidation checks
    pub route: Option<Route>,

    // DriveCtrl
    pub drive_ctrl: drive_ctrl::DriveCtrl,
    pub drive_ctrl_input: drive_ctrl::InputData,
    pub drive_ctrl_output: MoveCmd,
    pub drive_ctrl_status_rpt: drive_ctrl::StatusReport,

    // Gunnery
    pub fire_ctrl: gunnery::FireControl,
    pub fire_ctrl_output: TurretCmd,
    pub fire_ctrl_status_rpt: gunnery::StatusReport,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

/// The last accepted telemetry snapshot, converted into internal units.
///
/// All angles are radians; headings follow the internal convention of zero
/// along +Z with errors wrapped into [-pi, pi]. Conversion from the
/// simulator's degrees happens here, at ingest, and nowhere else.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TelemetryState {
    /// Simulation time of the snapshot, in seconds
    pub time_s: f64,

    /// Kinematic state of the hull derived from the snapshot
    pub kin: KinematicState,

    /// Barrel elevation in radians
    pub turret_elevation_rad: f64,

    /// Target position on the ground plane, in meters
    pub target_pos_m: Point2<f64>,

    /// Range to the target, in meters
    pub range_m: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors during telemetry ingest.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The snapshot's timestamp is not strictly newer than the last accepted
    /// one. Stale snapshots are discarded, never merged.
    #[error("Snapshot at {time_s:.3} s is not newer than the last accepted ({last_time_s:.3} s)")]
    StaleSnapshot { time_s: f64, last_time_s: f64 },
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Accept a telemetry snapshot into the store.
    ///
    /// Snapshots are accepted only if strictly newer than the last accepted
    /// one. Accepted snapshots are converted to internal units (radians,
    /// wrapped angles) as they land.
    pub fn ingest_snapshot(
        &mut self,
        snapshot: &TelemetrySnapshot,
    ) -> Result<(), TelemetryError> {
        if let Some(ref telem) = self.telem {
            if snapshot.time_s <= telem.time_s {
                self.num_stale_snapshots += 1;
                return Err(TelemetryError::StaleSnapshot {
                    time_s: snapshot.time_s,
                    last_time_s: telem.time_s,
                });
            }
        }

        let pose = Pose::new(
            Point2::new(snapshot.self_pos_m[0], snapshot.self_pos_m[2]),
            snapshot.self_body_heading_deg.to_radians(),
        );

        let mut kin = KinematicState::from_pose(&pose);
        kin.velocity_ms = kin.forward() * snapshot.self_speed_ms;

        self.telem = Some(TelemetryState {
            time_s: snapshot.time_s,
            kin,
            turret_elevation_rad: snapshot.self_turret_elevation_deg.to_radians(),
            target_pos_m: Point2::new(snapshot.target_pos_m[0], snapshot.target_pos_m[2]),
            range_m: snapshot.range_to_target_m,
        });

        Ok(())
    }

    /// Clear per-cycle items at the start of a new cycle.
    pub fn cycle_start(&mut self, cycle_frequency_hz: f64) {
        self.is_1_hz_cycle = self.num_cycles % (cycle_frequency_hz as u128) == 0;
    }

    /// Update the goal, returning true if it changed.
    pub fn update_goal(&mut self, goal_m: Option<Point2<f64>>) -> bool {
        if self.goal_m == goal_m {
            return false;
        }

        if goal_m.is_none() {
            warn!("Goal cleared");
        }

        self.goal_m = goal_m;
        true
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
