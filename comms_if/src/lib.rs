//! # Communications interface crate.
//!
//! Provides the datagram link between the camera module and the steering
//! controller.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment on the link (the steering controller)
pub mod eqpt;

/// Network module
pub mod net;
