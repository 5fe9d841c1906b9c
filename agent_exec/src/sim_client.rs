//! # Simulation Client
//!
//! The SimClient is the boundary between the control core and the simulator
//! transport. The transport side (which lives outside this workspace) pushes
//! telemetry snapshots, goals and obstacle updates in, and pulls the latest
//! commands out; the control loop reads the inputs and publishes commands
//! without ever blocking on the network.
//!
//! Every field is guarded by its own mutex, held only for the duration of
//! the read or write, never across a planning or control computation.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::sync::{Arc, Mutex};

use conquer_once::Lazy;

use sim_if::{
    cmd::{MoveCmd, TurretCmd},
    telem::{ObstacleRect, TelemetrySnapshot},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The shared boundary store.
#[derive(Clone, Default)]
pub struct SimClient {
    latest_snapshot: Arc<Mutex<Option<TelemetrySnapshot>>>,
    goal: Arc<Mutex<Option<(f64, f64, f64)>>>,
    obstacle_updates: Arc<Mutex<Vec<ObstacleRect>>>,
    move_cmd: Arc<Mutex<Option<MoveCmd>>>,
    turret_cmd: Arc<Mutex<Option<TurretCmd>>>,
}

// ------------------------------------------------------------------------------------------------
// GLOBALS
// ------------------------------------------------------------------------------------------------

static SIM_CLIENT: Lazy<Mutex<Option<SimClient>>> = Lazy::new(|| Mutex::new(None));

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimClient {
    /// Create a new client and register it as the global instance.
    ///
    /// Returns a handle which the transport side may clone and write into
    /// from its own thread.
    pub fn init() -> Self {
        let client = Self::default();

        *SIM_CLIENT.lock().expect("SIM_CLIENT mutex poisoned") = Some(client.clone());

        client
    }

    // ---- AGENT-FACING API ----

    /// Get the latest snapshot the transport has delivered, if any.
    ///
    /// Non-blocking: returns whatever is currently in the store, which may
    /// be the same snapshot as the previous cycle, or `None` before first
    /// contact. Staleness is the caller's concern.
    pub fn latest_snapshot(&self) -> Option<TelemetrySnapshot> {
        *self
            .latest_snapshot
            .lock()
            .expect("SimClient: latest_snapshot mutex poisoned")
    }

    /// Get the current goal position, if one has been commanded.
    pub fn goal(&self) -> Option<(f64, f64, f64)> {
        *self.goal.lock().expect("SimClient: goal mutex poisoned")
    }

    /// Take all obstacle updates delivered since the last call.
    pub fn take_obstacle_updates(&self) -> Vec<ObstacleRect> {
        let mut updates = self
            .obstacle_updates
            .lock()
            .expect("SimClient: obstacle_updates mutex poisoned");

        std::mem::take(&mut *updates)
    }

    /// Publish the movement command for this cycle.
    pub fn publish_move_cmd(&self, cmd: MoveCmd) {
        *self
            .move_cmd
            .lock()
            .expect("SimClient: move_cmd mutex poisoned") = Some(cmd);
    }

    /// Publish the turret command for this cycle.
    pub fn publish_turret_cmd(&self, cmd: TurretCmd) {
        *self
            .turret_cmd
            .lock()
            .expect("SimClient: turret_cmd mutex poisoned") = Some(cmd);
    }

    // ---- TRANSPORT-FACING API ----

    /// Deliver a new telemetry snapshot from the simulator.
    pub fn update_snapshot(&self, snapshot: TelemetrySnapshot) {
        *self
            .latest_snapshot
            .lock()
            .expect("SimClient: latest_snapshot mutex poisoned") = Some(snapshot);
    }

    /// Set or clear the goal position.
    pub fn set_goal(&self, goal: Option<(f64, f64, f64)>) {
        *self.goal.lock().expect("SimClient: goal mutex poisoned") = goal;
    }

    /// Queue an obstacle update for the control loop to consume.
    pub fn push_obstacle_update(&self, rect: ObstacleRect) {
        self.obstacle_updates
            .lock()
            .expect("SimClient: obstacle_updates mutex poisoned")
            .push(rect);
    }

    /// The last movement command the agent published, if any.
    pub fn latest_move_cmd(&self) -> Option<MoveCmd> {
        *self
            .move_cmd
            .lock()
            .expect("SimClient: move_cmd mutex poisoned")
    }

    /// The last turret command the agent published, if any.
    pub fn latest_turret_cmd(&self) -> Option<TurretCmd> {
        *self
            .turret_cmd
            .lock()
            .expect("SimClient: turret_cmd mutex poisoned")
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Get a clone of the global client, if it has been initialised.
pub fn global() -> Option<SimClient> {
    SIM_CLIENT
        .lock()
        .expect("SIM_CLIENT mutex poisoned")
        .clone()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use sim_if::cmd::MoveCmdKind;

    #[test]
    fn test_obstacle_updates_drain() {
        let client = SimClient::default();

        client.push_obstacle_update(ObstacleRect {
            x_min_m: 0.0,
            x_max_m: 1.0,
            z_min_m: 0.0,
            z_max_m: 1.0,
        });
        client.push_obstacle_update(ObstacleRect {
            x_min_m: 2.0,
            x_max_m: 3.0,
            z_min_m: 2.0,
            z_max_m: 3.0,
        });

        assert_eq!(client.take_obstacle_updates().len(), 2);

        // A second take returns nothing, the queue drained
        assert!(client.take_obstacle_updates().is_empty());
    }

    #[test]
    fn test_commands_latest_wins() {
        let client = SimClient::default();

        assert!(client.latest_move_cmd().is_none());

        client.publish_move_cmd(MoveCmd {
            kind: MoveCmdKind::Forward,
            weight: 0.5,
        });
        client.publish_move_cmd(MoveCmd::stop());

        assert_eq!(client.latest_move_cmd().unwrap().kind, MoveCmdKind::Stop);
    }
}
