//! # Simulated equipment
//!
//! Runs the frame loop without camera hardware. A timed scene script drives
//! a simulated camera, detector and touch panel which share one scene state.
//!
//! Scene scripts use the script interpreter format, one JSON command per
//! line:
//!
//! ```text
//! 0.0: {"Detections": [{"class_id": 0, "bbox": {"x": 300, "y": 250, "w": 40, "h": 100}, "score": 0.9}]};
//! 1.5: {"Touch": {"x": 630, "y": 10, "pressed": true}};
//! 3.0: "ClearDetections";
//! 4.0: "Exit";
//! ```
//!
//! Script time advances by the frame period on every captured frame, and frames
//! are stamped with it, so a scene (touch debounce included) replays
//! identically regardless of how fast the loop runs.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, trace};
use serde::Deserialize;
use std::{cell::RefCell, collections::VecDeque, path::Path, rc::Rc};

use util::script_interpreter::{PendingCmds, ScriptError, ScriptInterpreter};

use crate::{
    eqpt::{CamError, Detector, DisplayError, DisplaySink, Frame, FrameSource},
    frame_loop::Equipment,
    obstacle::Detection,
    overlay::DrawCmd,
    touch::{TouchError, TouchEvent, TouchSource},
};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command in a scene script.
#[derive(Debug, Clone, Deserialize)]
pub enum SceneCmd {
    /// Replace the objects in view.
    Detections(Vec<Detection>),

    /// Remove all objects from view.
    ClearDetections,

    /// Queue a raw touch sample, delivered on the next frame.
    Touch(TouchEvent),

    /// Stop the camera stream.
    Exit,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A scripted scene, shared between the simulated equipment.
#[derive(Clone)]
pub struct SimScene {
    state: Rc<RefCell<SceneState>>,
}

struct SceneState {
    script: Option<ScriptInterpreter<SceneCmd>>,
    frame_width: u32,
    frame_height: u32,
    frame_period_s: f64,
    start_time: DateTime<Utc>,
    num_frames: u64,
    detections: Vec<Detection>,
    touches: VecDeque<TouchEvent>,
    ended: bool,
}

pub struct SimCamera(SimScene);

pub struct SimDetector(SimScene);

pub struct SimTouch(SimScene);

/// A display which only logs what it would show.
#[derive(Default)]
pub struct LogDisplay {
    /// Number of frames shown.
    pub num_shown: u64,

    /// Text of the last overlay shown.
    pub last_texts: Vec<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimScene {
    /// Load a scene from a script file.
    pub fn new<P: AsRef<Path>>(
        script_path: P,
        frame_width: u32,
        frame_height: u32,
        frame_period_s: f64
    ) -> Result<Self, ScriptError> {
        let script = ScriptInterpreter::new(script_path)?;
        Ok(Self::from_interpreter(Some(script), frame_width, frame_height, frame_period_s))
    }

    /// Load a scene from the contents of a script.
    pub fn from_str(
        script: &str,
        frame_width: u32,
        frame_height: u32,
        frame_period_s: f64
    ) -> Result<Self, ScriptError> {
        let script = ScriptInterpreter::from_str(script)?;
        Ok(Self::from_interpreter(Some(script), frame_width, frame_height, frame_period_s))
    }

    /// An empty scene which never ends: no objects and no touches.
    pub fn idle(frame_width: u32, frame_height: u32, frame_period_s: f64) -> Self {
        Self::from_interpreter(None, frame_width, frame_height, frame_period_s)
    }

    fn from_interpreter(
        script: Option<ScriptInterpreter<SceneCmd>>,
        frame_width: u32,
        frame_height: u32,
        frame_period_s: f64
    ) -> Self {
        match script {
            Some(ref s) => info!(
                "Scene lasts {:.02} s and contains {} commands",
                s.get_duration(),
                s.get_num_cmds()
            ),
            None => info!("Idle scene, running until stopped"),
        }

        Self {
            state: Rc::new(RefCell::new(SceneState {
                script,
                frame_width,
                frame_height,
                frame_period_s,
                start_time: Utc::now(),
                num_frames: 0,
                detections: Vec::new(),
                touches: VecDeque::new(),
                ended: false,
            })),
        }
    }

    /// Simulated equipment for the frame loop, with a logging display.
    pub fn equipment(&self) -> Equipment {
        Equipment {
            camera: Box::new(SimCamera(self.clone())),
            detector: Box::new(SimDetector(self.clone())),
            touch: Box::new(SimTouch(self.clone())),
            display: Box::new(LogDisplay::default()),
        }
    }

    /// Current scene time.
    ///
    /// Units: seconds
    pub fn time_s(&self) -> f64 {
        let s = self.state.borrow();
        s.num_frames as f64 * s.frame_period_s
    }
}

impl SceneState {
    fn apply(&mut self, cmd: SceneCmd) {
        debug!("Scene command: {:?}", cmd);

        match cmd {
            SceneCmd::Detections(d) => self.detections = d,
            SceneCmd::ClearDetections => self.detections.clear(),
            SceneCmd::Touch(t) => self.touches.push_back(t),
            SceneCmd::Exit => self.ended = true,
        }
    }
}

impl FrameSource for SimCamera {
    fn read(&mut self) -> Result<Frame, CamError> {
        let mut s = self.0.state.borrow_mut();

        if s.ended {
            return Err(CamError::EndOfStream);
        }

        let time_s = s.num_frames as f64 * s.frame_period_s;
        let pending = match s.script {
            Some(ref mut script) => script.get_pending_cmds(time_s),
            None => PendingCmds::None,
        };

        match pending {
            PendingCmds::None => (),
            PendingCmds::Some(cmds) => {
                for c in cmds {
                    s.apply(c);
                }
            },
            PendingCmds::EndOfScript => {
                info!("End of scene script reached");
                s.ended = true;
            }
        }

        if s.ended {
            return Err(CamError::EndOfStream);
        }

        s.num_frames += 1;

        Ok(Frame {
            width: s.frame_width,
            height: s.frame_height,
            timestamp: s.start_time + Duration::microseconds((time_s * 1e6).round() as i64),
            pixels: Vec::new(),
        })
    }
}

impl Detector for SimDetector {
    fn detect(&mut self, _frame: &Frame, conf_threshold: f32) -> Vec<Detection> {
        self.0.state
            .borrow()
            .detections
            .iter()
            .filter(|d| d.score >= conf_threshold)
            .copied()
            .collect()
    }
}

impl TouchSource for SimTouch {
    fn read(&mut self) -> Result<Option<TouchEvent>, TouchError> {
        Ok(self.0.state.borrow_mut().touches.pop_front())
    }
}

impl DisplaySink for LogDisplay {
    fn show(&mut self, frame: &Frame, overlay: &[DrawCmd]) -> Result<(), DisplayError> {
        self.num_shown += 1;
        self.last_texts = overlay
            .iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect();

        trace!(
            "Display {}x{}: {} draw commands, text {:?}",
            frame.width,
            frame.height,
            overlay.len(),
            self.last_texts
        );

        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
