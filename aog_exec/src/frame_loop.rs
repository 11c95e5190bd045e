//! # Frame Loop
//!
//! One iteration per captured frame:
//!
//! - Frame capture and object detection
//! - Steering angle reception
//! - Touch acquisition and calibration
//! - Zone control: corridor calibration, geometry and obstacle classification
//! - Obstacle status transmission
//! - Overlay and display
//! - Frame report archiving
//!
//! Nothing inside an iteration is fatal. Faults of the collaborators and the
//! link are logged and the previous state is kept.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::Utc;
use log::{debug, info, trace, warn};
use std::{
    sync::atomic::{AtomicBool, Ordering},
    thread,
    time::{Duration, Instant},
};

use comms_if::eqpt::steer::ObstacleStatus;
use util::{
    archive::{ArchiveError, Archived, Archiver},
    module::State,
};

use crate::{
    data_store::{DataStore, FrameReport},
    eqpt::{CamError, Detector, DisplaySink, FrameSource},
    link_client::{AngleReceiver, LinkError, StatusSender},
    overlay,
    params::AogExecParams,
    touch::{TouchCalibrator, TouchError, TouchEvent, TouchSource},
    zone_ctrl::{self, ZoneCtrlError},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// The external equipment driven by the loop.
pub struct Equipment {
    pub camera: Box<dyn FrameSource>,
    pub detector: Box<dyn Detector>,
    pub touch: Box<dyn TouchSource>,
    pub display: Box<dyn DisplaySink>,
}

/// Both directions of the steering controller link.
pub struct Link {
    pub status_sender: StatusSender,

    /// `None` runs the loop with a fixed straight ahead steering angle.
    pub angle_receiver: Option<AngleReceiver>,
}

/// The per-frame orchestrator.
pub struct FrameLoop {
    params: AogExecParams,

    eqpt: Equipment,
    link: Link,
    touch_cal: TouchCalibrator,

    arch_frame_report: Archiver,
    report: Option<FrameReport>,

    /// All data produced by the loop.
    pub ds: DataStore,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum FrameLoopError {
    #[error("Could not initialise ZoneCtrl: {0}")]
    ZoneCtrlInitError(ZoneCtrlError),

    #[error("ZoneCtrl processing failed: {0}")]
    ZoneCtrlProcError(ZoneCtrlError),

    #[error("Could not set up the touch calibration: {0}")]
    TouchCalError(TouchError),
}

/// The result of a single iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StepOutcome {
    /// The frame was processed.
    Processed,

    /// The frame could not be captured and was skipped.
    Skipped,

    /// The camera has no more frames.
    EndOfStream,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FrameLoop {
    /// Create the loop, initialising zone control.
    ///
    /// Without an archiver (`None`) frame reports are not archived.
    pub fn new(
        params: AogExecParams,
        zone_params: zone_ctrl::Params,
        eqpt: Equipment,
        link: Link,
        arch_frame_report: Option<Archiver>
    ) -> Result<Self, FrameLoopError> {
        let mut ds = DataStore::default();

        ds.zone_ctrl.init(zone_ctrl::InitData {
            params: zone_params,
            frame_width: params.frame_width,
            frame_height: params.frame_height,
        }).map_err(FrameLoopError::ZoneCtrlInitError)?;
        info!("ZoneCtrl init complete");

        let touch_cal = TouchCalibrator::new(
            params.touch_raw_width,
            params.touch_raw_height,
            params.frame_width,
            params.frame_height
        ).map_err(FrameLoopError::TouchCalError)?;

        if !link.status_sender.is_connected() {
            warn!("Status link unavailable, obstacle status will not be sent");
        }

        Ok(Self {
            params,
            eqpt,
            link,
            touch_cal,
            arch_frame_report: arch_frame_report.unwrap_or_default(),
            report: None,
            ds,
        })
    }

    /// Run iterations until an exit is requested, the camera runs out of
    /// frames or `max_frames` have been processed.
    ///
    /// Returns the number of frames processed.
    pub fn run(&mut self, exit: &AtomicBool, max_frames: Option<u64>) -> Result<u64, FrameLoopError> {
        info!("Begining frame loop\n");

        while !exit.load(Ordering::Relaxed) {
            if let Some(max) = max_frames {
                if self.ds.num_frames >= max {
                    info!("Frame limit ({}) reached, stopping", max);
                    break;
                }
            }

            let cycle_start_instant = Instant::now();

            match self.step()? {
                StepOutcome::EndOfStream => {
                    info!("End of camera stream reached, stopping");
                    break;
                },
                StepOutcome::Processed | StepOutcome::Skipped => (),
            }

            // ---- CYCLE MANAGEMENT ----

            if self.params.cycle_period_s > 0.0 {
                let period = Duration::from_secs_f64(self.params.cycle_period_s);
                let cycle_dur = Instant::now() - cycle_start_instant;

                match period.checked_sub(cycle_dur) {
                    Some(d) => {
                        self.ds.num_consec_cycle_overruns = 0;
                        thread::sleep(d);
                    },
                    None => {
                        warn!(
                            "Cycle overran by {:.06} s",
                            cycle_dur.as_secs_f64() - period.as_secs_f64()
                        );
                        self.ds.num_consec_cycle_overruns += 1;
                    }
                }
            }
        }

        info!("Frame loop stopped after {} frames", self.ds.num_frames);

        Ok(self.ds.num_frames)
    }

    /// Run a single iteration.
    pub fn step(&mut self) -> Result<StepOutcome, FrameLoopError> {
        let now = Utc::now();
        self.ds.cycle_start(now);
        self.report = None;

        // ---- FRAME ACQUISITION ----

        let frame = match self.eqpt.camera.read() {
            Ok(f) => f,
            Err(CamError::EndOfStream) => return Ok(StepOutcome::EndOfStream),
            Err(e) => {
                warn!("Frame skipped: {}", e);
                return Ok(StepOutcome::Skipped);
            }
        };

        let detections = self.eqpt.detector.detect(
            &frame,
            self.params.detection_conf_threshold
        );
        trace!("{} detections", detections.len());

        // ---- STEERING ANGLE ----

        if let Some(ref mut rx) = self.link.angle_receiver {
            match rx.receive_angle() {
                Ok(Some(angle)) => {
                    self.ds.steering.update(angle, now);

                    if DataStore::throttle(
                        &mut self.ds.last_angle_log,
                        now,
                        self.params.angle_log_period_s
                    ) {
                        info!("Steering angle: {:.1} deg", angle);
                    }
                },
                Ok(None) => (),
                Err(LinkError::AngleParseError(e)) => warn!("Ignoring angle datagram: {}", e),
                Err(e) => warn!("Angle reception error: {}", e),
            }
        }

        let steering_angle_deg = self.ds.steering.angle_deg;

        // ---- TOUCH ----

        let touch = match self.eqpt.touch.read() {
            Ok(Some(raw)) => Some(self.calibrate_touch(&raw)),
            Ok(None) => None,
            Err(e) => {
                warn!("Touch read error: {}", e);
                None
            }
        };

        // ---- ZONE CONTROL ----

        let (zone_out, zone_rpt) = self.ds.zone_ctrl.proc(&zone_ctrl::InputData {
            touch,
            steering_angle_deg,
            detections: detections.clone(),
            // Touch debounce runs on the camera clock
            timestamp: frame.timestamp,
        }).map_err(FrameLoopError::ZoneCtrlProcError)?;

        // ---- LINK ----

        if zone_out.detection_enabled && self.link.status_sender.is_connected() {
            let status = ObstacleStatus {
                has_obstacle: zone_out.classification.has_obstacle,
                count: zone_out.classification.offending.len(),
                steering_angle_deg,
            };

            match self.link.status_sender.send_status(&status) {
                Ok(()) => self.ds.status_sent = true,
                Err(e) => warn!("Could not send obstacle status: {}", e),
            }
        }

        if zone_out.classification.has_obstacle
            && DataStore::throttle(
                &mut self.ds.last_obstacle_log,
                now,
                self.params.obstacle_log_period_s
            )
        {
            info!(
                "Obstacle in corridor: {} | angle {:.1} deg | link {}",
                zone_out.classification.summary(),
                steering_angle_deg,
                if self.link.status_sender.is_connected() { "up" } else { "down" }
            );
        }

        // ---- DISPLAY ----

        if let Some(config) = self.ds.zone_ctrl.config() {
            let cmds = overlay::build_overlay(
                config,
                &zone_out,
                &detections,
                steering_angle_deg,
                self.link.status_sender.is_connected()
            );

            if let Err(e) = self.eqpt.display.show(&frame, &cmds) {
                warn!("Display error: {}", e);
            }
        }

        // ---- ARCHIVE ----

        self.ds.zone_ctrl_output = Some(zone_out);
        self.ds.zone_ctrl_status_rpt = zone_rpt;
        self.report = self.ds.frame_report();

        match self.write() {
            Ok(()) | Err(ArchiveError::NotInitialised) => (),
            Err(e) => warn!("Could not archive the frame report: {}", e),
        }

        self.ds.num_frames += 1;

        Ok(StepOutcome::Processed)
    }

    /// The report of the last processed frame.
    pub fn last_report(&self) -> Option<&FrameReport> {
        self.report.as_ref()
    }

    /// Map a raw touch sample into display coordinates, logging the first
    /// few samples.
    fn calibrate_touch(&mut self, raw: &TouchEvent) -> TouchEvent {
        let t = self.touch_cal.to_display(raw);

        if self.ds.num_touches_logged < self.params.num_logged_touches {
            self.ds.num_touches_logged += 1;
            info!(
                "Touch {}: raw ({}, {}) -> display ({}, {}), pressed: {}",
                self.ds.num_touches_logged, raw.x, raw.y, t.x, t.y, t.pressed
            );
        }
        else {
            debug!("Touch ({}, {}) pressed: {}", t.x, t.y, t.pressed);
        }

        t
    }
}

impl Archived for FrameLoop {
    fn write(&mut self) -> Result<(), ArchiveError> {
        match self.report {
            Some(ref r) => self.arch_frame_report.serialise(r),
            None => Ok(()),
        }
    }
}
