//! # Agent executable library
//!
//! Everything in `agent_exec` except the entry point itself, so that the
//! autonomy modules are usable from the test binaries and benchmarks.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod auto;
pub mod data_store;
pub mod sim_client;
