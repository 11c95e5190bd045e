//! # Equipment Interface
//!
//! This module defines the messages exchanged with equipment on the link.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod steer;
