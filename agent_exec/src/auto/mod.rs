//! # Autonomy module
//!
//! Everything needed to turn a telemetry snapshot into actuator commands:
//!
//! - `kin` - kinematic state model with bounded integration
//! - `steer` - seek/arrive/pursuit steering behaviours
//! - `nav` - occupancy grid and A* path finder
//! - `drive_ctrl` - heading/speed controller producing movement commands
//! - `gunnery` - ballistic targeting producing turret commands

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

pub mod drive_ctrl;
pub mod gunnery;
pub mod kin;
pub mod nav;
pub mod steer;
