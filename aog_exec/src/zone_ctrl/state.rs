//! Implementations for the ZoneCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use chrono::{DateTime, Utc};
use log::trace;
use serde::Serialize;

// Internal
use super::{Corridor, CorridorConfig, Handle, Mode, Params, ZoneCtrlError};
use crate::{
    obstacle::{self, Classification, Detection},
    touch::TouchEvent,
};
use util::module::State;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Zone control module state
#[derive(Default)]
pub struct ZoneCtrl {
    pub(crate) config: Option<CorridorConfig>,

    pub(crate) report: StatusReport,
}

/// Initialisation data for ZoneCtrl.
#[derive(Debug, Clone)]
pub struct InitData {
    pub params: Params,

    /// Units: pixels
    pub frame_width: u32,

    /// Units: pixels
    pub frame_height: u32,
}

/// Input data to zone control, gathered once per frame.
#[derive(Debug, Clone)]
pub struct InputData {
    /// The touch sample for this frame in display coordinates, if any.
    pub touch: Option<TouchEvent>,

    /// Last known good steering angle.
    ///
    /// Units: degrees
    pub steering_angle_deg: f64,

    /// Detector output for this frame.
    pub detections: Vec<Detection>,

    /// Wall clock time the frame was processed, used for touch debouncing.
    pub timestamp: DateTime<Utc>,
}

/// Output of zone control for one frame.
#[derive(Debug, Clone)]
pub struct OutputData {
    pub corridor: Corridor,

    pub classification: Classification,

    pub detection_enabled: bool,

    pub mode: Mode,

    pub selected_handle: Option<Handle>,
}

/// Status report for ZoneCtrl processing.
#[derive(Clone, Copy, Default, Serialize, Debug)]
pub struct StatusReport {
    /// The touch sample changed the configuration or the UI state.
    pub touch_consumed: bool,

    /// Number of recognised detections inside the corridor.
    pub num_offending: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ZoneCtrl {
    /// The corridor configuration, `None` before initialisation.
    pub fn config(&self) -> Option<&CorridorConfig> {
        self.config.as_ref()
    }
}

impl State for ZoneCtrl {
    type InitData = InitData;
    type InitError = ZoneCtrlError;

    type InputData = InputData;
    type OutputData = OutputData;
    type StatusReport = StatusReport;
    type ProcError = ZoneCtrlError;

    /// Initialise the ZoneCtrl module.
    ///
    /// Builds the startup corridor configuration from the parameters and the
    /// camera frame size.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError> {
        self.config = Some(CorridorConfig::new(
            &init_data.params,
            init_data.frame_width,
            init_data.frame_height
        )?);

        self.report = StatusReport::default();

        Ok(())
    }

    /// Perform cyclic processing of zone control.
    ///
    /// The touch sample is applied first so the corridor and the
    /// classification of this frame already reflect it.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        self.report = StatusReport::default();

        let config = self.config.as_mut().ok_or(ZoneCtrlError::NotInitialised)?;

        if let Some(ref touch) = input_data.touch {
            self.report.touch_consumed = config.handle_touch(
                touch,
                input_data.steering_angle_deg,
                input_data.timestamp
            );
        }

        let corridor = config.corridor(input_data.steering_angle_deg);
        let classification = obstacle::classify(
            &input_data.detections,
            &corridor,
            config.detection_enabled
        );

        self.report.num_offending = classification.offending.len();

        trace!(
            "ZoneCtrl: corridor {:?}, {} offending, obstacle {}",
            corridor.quad(),
            self.report.num_offending,
            classification.has_obstacle
        );

        let output = OutputData {
            corridor,
            classification,
            detection_enabled: config.detection_enabled,
            mode: config.mode(),
            selected_handle: config.selected_handle(),
        };

        Ok((output, self.report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::obstacle::BBox;

    fn input(touch: Option<TouchEvent>, timestamp: DateTime<Utc>) -> InputData {
        InputData {
            touch,
            steering_angle_deg: 0.0,
            detections: vec![Detection {
                class_id: 0,
                bbox: BBox { x: 300, y: 250, w: 40, h: 100 },
                score: 0.9,
            }],
            timestamp,
        }
    }

    fn init_zone_ctrl() -> ZoneCtrl {
        let mut zc = ZoneCtrl::default();
        zc.init(InitData {
            params: Params::default(),
            frame_width: 640,
            frame_height: 480,
        }).unwrap();
        zc
    }

    #[test]
    fn test_proc_before_init() {
        let mut zc = ZoneCtrl::default();
        assert!(matches!(
            zc.proc(&input(None, Utc::now())),
            Err(ZoneCtrlError::NotInitialised)
        ));
    }

    #[test]
    fn test_init_rejects_bad_frame() {
        let mut zc = ZoneCtrl::default();
        let res = zc.init(InitData {
            params: Params::default(),
            frame_width: 0,
            frame_height: 480,
        });

        assert!(matches!(res, Err(ZoneCtrlError::InvalidFrameSize(0, 480))));
        assert!(zc.config().is_none());
    }

    #[test]
    fn test_detect_toggle_applies_same_frame() {
        let mut zc = init_zone_ctrl();
        let now = Utc::now();

        let (out, rpt) = zc.proc(&input(None, now)).unwrap();
        assert!(out.classification.has_obstacle);
        assert!(!rpt.touch_consumed);
        assert_eq!(rpt.num_offending, 1);

        let toggle = TouchEvent { x: 600, y: 10, pressed: true };
        let (out, rpt) = zc.proc(&input(Some(toggle), now)).unwrap();
        assert!(rpt.touch_consumed);
        assert!(!out.detection_enabled);
        assert!(!out.classification.has_obstacle);
        assert_eq!(out.classification.offending.len(), 1);
        assert_eq!(out.mode, Mode::Viewing);
    }
}
