//! # Telemetry definitions
//!
//! Telemetry arrives from the simulator as periodic world-state snapshots.
//! Angles on the wire are in degrees, as the simulator reports them; the
//! agent converts to radians at ingest and keeps radians internally.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A world-state snapshot published by the simulator.
///
/// Snapshots are only valid if their `time_s` is strictly newer than the last
/// accepted snapshot, out-of-order snapshots must be discarded by the
/// receiver, never merged.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    /// Simulation elapsed time at which this snapshot was taken, in seconds.
    pub time_s: f64,

    /// Position of the agent in the world frame, in meters. The simulator's
    /// world frame is X/Y/Z with Y up; ground navigation uses the X/Z plane.
    pub self_pos_m: [f64; 3],

    /// Speed of the agent over the ground in meters/second.
    pub self_speed_ms: f64,

    /// Heading of the agent's hull in degrees.
    pub self_body_heading_deg: f64,

    /// Elevation of the agent's barrel above the horizontal in degrees.
    pub self_turret_elevation_deg: f64,

    /// Position of the tracked target in the world frame, in meters.
    pub target_pos_m: [f64; 3],

    /// Straight line distance from the agent to the target, in meters.
    pub range_to_target_m: f64,
}

/// An axis-aligned obstacle footprint reported by the simulator.
///
/// Rectangles are given in world-frame meters on the ground (X/Z) plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleRect {
    pub x_min_m: f64,
    pub x_max_m: f64,
    pub z_min_m: f64,
    pub z_max_m: f64,
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_snapshot_wire_round_trip() {
        let snapshot = TelemetrySnapshot {
            time_s: 12.5,
            self_pos_m: [60.0, 10.0, 27.23],
            self_speed_ms: 0.8,
            self_body_heading_deg: 90.0,
            self_turret_elevation_deg: 2.5,
            target_pos_m: [59.0, 10.0, 280.0],
            range_to_target_m: 252.77,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: TelemetrySnapshot = serde_json::from_str(&json).unwrap();

        assert_eq!(back.time_s, snapshot.time_s);
        assert_eq!(back.self_pos_m, snapshot.self_pos_m);
        assert_eq!(back.range_to_target_m, snapshot.range_to_target_m);
    }
}
