//! Zone control module
//!
//! Owns the danger corridor: its ratio-space configuration, the
//! steering-reactive geometry derived from it every frame, and the touch
//! calibration state machine which edits it.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calib;
mod config;
mod geometry;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use config::*;
pub use geometry::*;
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The near edge is never placed above this fraction of the frame height.
pub const NEAR_Y_MIN_RATIO: f64 = 0.55;

/// The far edge is never placed below this fraction of the frame height.
pub const FAR_Y_MAX_RATIO: f64 = 0.80;

/// Fraction of the far edge's lateral shift applied to the near edge.
pub const NEAR_SHIFT_FRACTION: f64 = 0.1;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during ZoneCtrl operation.
#[derive(Debug, thiserror::Error)]
pub enum ZoneCtrlError {
    #[error("Invalid zone parameter {0}: {1}")]
    InvalidParam(&'static str, String),

    #[error("Invalid frame size {0}x{1}")]
    InvalidFrameSize(u32, u32),

    #[error("ZoneCtrl has not been initialised")]
    NotInitialised,
}
