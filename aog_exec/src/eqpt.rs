//! # Equipment interfaces
//!
//! The camera, the object detector and the display are external to the
//! software. These traits are the boundary the frame loop drives them
//! through, the touch panel's is [`crate::touch::TouchSource`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};

use crate::{obstacle::Detection, overlay::DrawCmd};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// A source of camera frames.
pub trait FrameSource {
    /// Capture the next frame, blocking until it is available.
    fn read(&mut self) -> Result<Frame, CamError>;
}

/// An object detector.
pub trait Detector {
    /// Run detection on the frame, returning detections with a score of at
    /// least `conf_threshold`.
    fn detect(&mut self, frame: &Frame, conf_threshold: f32) -> Vec<Detection>;
}

/// A display the frame and its overlay are shown on.
pub trait DisplaySink {
    fn show(&mut self, frame: &Frame, overlay: &[DrawCmd]) -> Result<(), DisplayError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Units: pixels
    pub width: u32,

    /// Units: pixels
    pub height: u32,

    /// Capture time of the frame.
    pub timestamp: DateTime<Utc>,

    /// Raw pixel buffer, in the camera's native format. Empty for simulated
    /// frames.
    pub pixels: Vec<u8>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum CamError {
    #[error("The camera has no more frames")]
    EndOfStream,

    #[error("Frame capture failed: {0}")]
    CaptureFailed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("Could not show the frame: {0}")]
    ShowFailed(String),
}
