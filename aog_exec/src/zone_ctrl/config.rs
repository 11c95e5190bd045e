//! Corridor configuration: the persistent, touch-editable description of the
//! corridor shape.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Params, Rect, ZoneCtrlError, NEAR_Y_MIN_RATIO};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The corridor configuration.
///
/// Shape parameters are stored as ratios of the frame dimensions. The UI
/// state (mode, selected handle, debounce timestamp) lives here too since it
/// is only ever changed together with the shape, by
/// [`CorridorConfig::handle_touch`].
#[derive(Debug, Clone)]
pub struct CorridorConfig {
    pub(crate) frame_width: u32,
    pub(crate) frame_height: u32,

    // ---- SHAPE ----
    pub bottom_y_ratio: f64,
    pub top_y_ratio: f64,
    pub near_half_width_ratio: f64,
    pub far_half_width_ratio: f64,

    // ---- STEERING REACTION ----
    pub max_shift_ratio: f64,
    pub max_steering_for_full_shift_deg: f64,
    pub shift_far_coefficient: f64,

    // ---- LIMITS ----
    pub min_half_ratio: f64,
    pub max_half_ratio: f64,
    pub min_height_px: i32,

    // ---- UI STATE ----
    pub detection_enabled: bool,
    pub(crate) mode: Mode,
    pub(crate) selected_handle: Option<Handle>,
    pub(crate) last_touch_timestamp: Option<DateTime<Utc>>,
    pub(crate) touch_cooldown_ms: i64,
    pub(crate) touch_threshold_px: f64,
    pub(crate) button_width_px: i32,
    pub(crate) button_height_px: i32,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Interaction mode of the calibration UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Mode {
    /// Normal operation, only the buttons react to touch.
    Viewing,

    /// The corridor handles can be dragged.
    Editing,
}

/// A draggable control point of the corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Handle {
    /// Near-left corner: near edge half width and vertical position.
    Near,

    /// Far-left corner: far edge half width and vertical position.
    Far,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl CorridorConfig {
    /// Build the startup configuration for a frame of the given size.
    pub fn new(
        params: &Params,
        frame_width: u32,
        frame_height: u32
    ) -> Result<Self, ZoneCtrlError> {
        params.validate()?;

        if frame_width == 0 || frame_height == 0 || frame_width > i32::MAX as u32 || frame_height > i32::MAX as u32 {
            return Err(ZoneCtrlError::InvalidFrameSize(frame_width, frame_height));
        }

        // The highest near edge row must leave room for the minimum height
        // below it and still lie inside the frame.
        let near_min_y = (frame_height as f64 * NEAR_Y_MIN_RATIO).round() as i32;
        if near_min_y < params.min_height_px || near_min_y > frame_height as i32 - 1 {
            return Err(ZoneCtrlError::InvalidFrameSize(frame_width, frame_height));
        }

        Ok(Self {
            frame_width,
            frame_height,
            bottom_y_ratio: params.bottom_y_ratio,
            top_y_ratio: params.top_y_ratio,
            near_half_width_ratio: params.near_half_width_ratio,
            far_half_width_ratio: params.far_half_width_ratio,
            max_shift_ratio: params.max_shift_ratio,
            max_steering_for_full_shift_deg: params.max_steering_for_full_shift_deg,
            shift_far_coefficient: params.shift_far_coefficient,
            min_half_ratio: params.min_half_ratio,
            max_half_ratio: params.max_half_ratio,
            min_height_px: params.min_height_px,
            detection_enabled: params.detection_enabled,
            mode: Mode::Viewing,
            selected_handle: None,
            last_touch_timestamp: None,
            touch_cooldown_ms: params.touch_cooldown_ms,
            touch_threshold_px: params.touch_threshold_px,
            button_width_px: params.button_width_px,
            button_height_px: params.button_height_px,
        })
    }

    /// Current interaction mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The handle being dragged, always `None` while viewing.
    pub fn selected_handle(&self) -> Option<Handle> {
        self.selected_handle
    }

    /// Frame size the configuration was built for.
    pub fn frame_size(&self) -> (u32, u32) {
        (self.frame_width, self.frame_height)
    }

    /// Hit area of the edit/save toggle, at the top left of the frame.
    pub fn edit_button(&self) -> Rect {
        Rect {
            x: 0,
            y: 0,
            w: self.button_width_px,
            h: self.button_height_px,
        }
    }

    /// Hit area of the detection toggle, at the top right of the frame.
    pub fn detect_button(&self) -> Rect {
        Rect {
            x: self.frame_width as i32 - self.button_width_px,
            y: 0,
            w: self.button_width_px,
            h: self.button_height_px,
        }
    }
}
