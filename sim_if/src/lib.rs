//! # Simulator interface definitions
//!
//! This crate defines the data exchanged between the agent software and the
//! simulator transport layer: telemetry snapshots coming in from the
//! simulator, and movement/turret commands going back out. The transport
//! executable itself lives outside this workspace, only the shared types are
//! defined here.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod cmd;
pub mod telem;
