//! # Turret commands

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::CmdError;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The discrete turret actions the simulator accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurretCmdKind {
    /// Rotate the turret ring to the left (decreasing bearing).
    RotateLeft,

    /// Rotate the turret ring to the right (increasing bearing).
    RotateRight,

    /// Raise the barrel.
    ElevateUp,

    /// Lower the barrel.
    ElevateDown,

    /// Fire the main gun.
    Fire,

    /// Hold the turret where it is.
    None,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A turret command: a discrete action and a normalised actuation weight.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurretCmd {
    pub kind: TurretCmdKind,
    pub weight: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TurretCmd {
    /// Build a new command, validating the weight is finite and in [0, 1].
    pub fn new(kind: TurretCmdKind, weight: f64) -> Result<Self, CmdError> {
        if !weight.is_finite() || !(0.0..=1.0).contains(&weight) {
            return Err(CmdError::InvalidWeight(weight));
        }

        Ok(Self { kind, weight })
    }

    /// A command which holds the turret in place.
    pub fn none() -> Self {
        Self {
            kind: TurretCmdKind::None,
            weight: 0.0,
        }
    }

    /// A full-weight fire command.
    pub fn fire() -> Self {
        Self {
            kind: TurretCmdKind::Fire,
            weight: 1.0,
        }
    }
}

impl Default for TurretCmd {
    fn default() -> Self {
        Self::none()
    }
}
