//! # Touch input
//!
//! Touch samples arrive from a digitizer whose coordinate range does not
//! match the display. [`TouchCalibrator`] maps raw samples into display
//! coordinates before they reach the corridor calibration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use util::maths::{clamp, lin_map};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of touch samples, polled once per frame.
pub trait TouchSource {
    /// Read the latest sample.
    ///
    /// Returns `Ok(None)` if no touch is present this frame. The coordinates
    /// are in the source's raw range.
    fn read(&mut self) -> Result<Option<TouchEvent>, TouchError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A single touch sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TouchEvent {
    pub x: i32,
    pub y: i32,

    /// Whether the digitizer reported the panel as pressed. Some panels
    /// report continuous motion as not pressed.
    pub pressed: bool,
}

/// Linear mapping from the digitizer range to the display.
#[derive(Debug, Clone, Copy)]
pub struct TouchCalibrator {
    raw_width: f64,
    raw_height: f64,
    display_width: i32,
    display_height: i32,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum TouchError {
    #[error("The touch device could not be read: {0}")]
    ReadError(String),

    #[error("Invalid touch calibration: raw {0}x{1}, display {2}x{3}")]
    InvalidCalibration(u32, u32, u32, u32),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TouchCalibrator {
    /// Create a calibrator from the raw panel size to the display size.
    pub fn new(
        raw_width: u32,
        raw_height: u32,
        display_width: u32,
        display_height: u32
    ) -> Result<Self, TouchError> {
        if raw_width == 0
            || raw_height == 0
            || display_width == 0
            || display_height == 0
            || display_width > i32::MAX as u32
            || display_height > i32::MAX as u32
        {
            return Err(TouchError::InvalidCalibration(
                raw_width, raw_height, display_width, display_height
            ));
        }

        Ok(Self {
            raw_width: raw_width as f64,
            raw_height: raw_height as f64,
            display_width: display_width as i32,
            display_height: display_height as i32,
        })
    }

    /// Map a raw sample into display coordinates, clamped to the display.
    ///
    /// Panel sizes are scaled onto display sizes and the result truncated
    /// towards zero.
    pub fn to_display(&self, raw: &TouchEvent) -> TouchEvent {
        let max_x = self.display_width - 1;
        let max_y = self.display_height - 1;

        let x = lin_map(
            (0.0, self.raw_width),
            (0.0, self.display_width as f64),
            raw.x as f64
        ) as i32;
        let y = lin_map(
            (0.0, self.raw_height),
            (0.0, self.display_height as f64),
            raw.y as f64
        ) as i32;

        TouchEvent {
            x: clamp(&x, &0, &max_x),
            y: clamp(&y, &0, &max_y),
            pressed: raw.pressed,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
