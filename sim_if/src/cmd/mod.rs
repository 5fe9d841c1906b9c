//! # Command definitions
//!
//! Commands issued by the agent to the simulator. Every control cycle the
//! agent publishes exactly one movement command and one turret command, each
//! a discrete kind plus a normalised actuation weight.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod drive;
mod turret;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use drive::{MoveCmd, MoveCmdKind};
pub use turret::{TurretCmd, TurretCmdKind};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// An error in building a command.
#[derive(Debug, thiserror::Error)]
pub enum CmdError {
    /// The weight of a command must be a finite value in [0, 1].
    #[error("Command weight {0} is outside [0, 1]")]
    InvalidWeight(f64),
}
