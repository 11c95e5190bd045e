//! # AOG library.
//!
//! This library allows other crates in the workspace (and the integration tests) to access items
//! defined inside the AOG camera module crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Data store - all data produced by the frame loop
pub mod data_store;

/// Equipment interfaces - camera, detector and display boundaries
pub mod eqpt;

/// Frame loop - runs all processing once per captured frame
pub mod frame_loop;

/// Link client - obstacle status out, steering angle in
pub mod link_client;

/// Obstacle classifier - recognised objects inside the corridor
pub mod obstacle;

/// Overlay - draw primitives shown over each frame
pub mod overlay;

/// Executable parameters
pub mod params;

/// Simulated equipment driven by scene scripts
pub mod sim;

/// Touch input and calibration
pub mod touch;

/// Zone control - the danger corridor, its geometry and its touch calibration
pub mod zone_ctrl;
