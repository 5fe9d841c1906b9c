//! # Movement commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::CmdError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The discrete movement actions the simulator accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveCmdKind {
    /// Bring the hull to a halt, maintaining the current heading.
    Stop,

    /// Drive forwards along the current heading.
    Forward,

    /// Drive backwards along the current heading.
    Back,

    /// Rotate the hull to the left (decreasing heading).
    TurnLeft,

    /// Rotate the hull to the right (increasing heading).
    TurnRight,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A movement command: a discrete action and a normalised actuation weight.
///
/// The weight scales how hard the simulator applies the action, `1.0` being
/// full actuation. Weights are never zero, a command that would actuate
/// nothing must be sent as `Stop` instead.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoveCmd {
    pub kind: MoveCmdKind,
    pub weight: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MoveCmd {
    /// Build a new command, validating the weight is finite and in [0, 1].
    pub fn new(kind: MoveCmdKind, weight: f64) -> Result<Self, CmdError> {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(CmdError::InvalidWeight(weight));
        }

        Ok(Self { kind, weight })
    }

    /// A full-weight stop command.
    pub fn stop() -> Self {
        Self {
            kind: MoveCmdKind::Stop,
            weight: 1.0,
        }
    }
}

impl Default for MoveCmd {
    fn default() -> Self {
        Self::stop()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
