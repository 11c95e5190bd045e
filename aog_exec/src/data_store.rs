//! # Data Store

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    link_client::SteeringState,
    zone_ctrl::{self, Mode},
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the frame loop.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of frames already processed
    pub num_frames: u64,

    /// Wall clock time at the start of this frame
    pub frame_time: Option<DateTime<Utc>>,

    /// Wall clock time the first frame started
    pub start_time: Option<DateTime<Utc>>,

    // Steering
    pub steering: SteeringState,

    // ZoneCtrl
    pub zone_ctrl: zone_ctrl::ZoneCtrl,
    pub zone_ctrl_output: Option<zone_ctrl::OutputData>,
    pub zone_ctrl_status_rpt: zone_ctrl::StatusReport,

    // Link
    /// True if the status was sent this frame
    pub status_sent: bool,

    // Log throttling
    pub last_angle_log: Option<DateTime<Utc>>,
    pub last_obstacle_log: Option<DateTime<Utc>>,
    pub num_touches_logged: u32,

    // Monitoring Counters
    /// Number of consecutive cycle overruns
    pub num_consec_cycle_overruns: u64,
}

/// Summary of one frame, archived as a CSV row.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FrameReport {
    pub frame: u64,

    /// Time since the first frame.
    ///
    /// Units: seconds
    pub time_s: f64,

    /// Units: degrees
    pub steering_angle_deg: f64,

    pub mode: Mode,
    pub detection_enabled: bool,
    pub has_obstacle: bool,
    pub num_offending: usize,
    pub touch_consumed: bool,
    pub status_sent: bool,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a frame.
    ///
    /// Clears the per-frame items and stamps the frame time.
    pub fn cycle_start(&mut self, now: DateTime<Utc>) {
        self.frame_time = Some(now);
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }

        self.zone_ctrl_output = None;
        self.zone_ctrl_status_rpt = zone_ctrl::StatusReport::default();
        self.status_sent = false;
    }

    /// Seconds between the first frame and this one.
    pub fn elapsed_s(&self) -> f64 {
        match (self.start_time, self.frame_time) {
            (Some(s), Some(f)) => util::time::duration_to_seconds(f.signed_duration_since(s))
                .unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// Returns true if at least `period_s` has passed since `last`, in which
    /// case `last` is moved to the current frame time.
    ///
    /// A clock which stepped backwards counts as the period having passed.
    pub fn throttle(last: &mut Option<DateTime<Utc>>, now: DateTime<Utc>, period_s: f64) -> bool {
        let due = match *last {
            Some(l) => {
                let ms = util::time::millis_between(&l, &now);
                ms < 0 || ms as f64 >= period_s * 1000.0
            },
            None => true,
        };

        if due {
            *last = Some(now);
        }

        due
    }

    /// Build the report of the current frame.
    pub fn frame_report(&self) -> Option<FrameReport> {
        let out = self.zone_ctrl_output.as_ref()?;

        Some(FrameReport {
            frame: self.num_frames,
            time_s: self.elapsed_s(),
            steering_angle_deg: self.steering.angle_deg,
            mode: out.mode,
            detection_enabled: out.detection_enabled,
            has_obstacle: out.classification.has_obstacle,
            num_offending: out.classification.offending.len(),
            touch_consumed: self.zone_ctrl_status_rpt.touch_consumed,
            status_sent: self.status_sent,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_throttle() {
        let t0 = Utc::now();
        let mut last = None;

        assert!(DataStore::throttle(&mut last, t0, 1.0));
        assert!(!DataStore::throttle(&mut last, t0 + Duration::milliseconds(999), 1.0));
        assert!(DataStore::throttle(&mut last, t0 + Duration::milliseconds(1000), 1.0));
        assert_eq!(last, Some(t0 + Duration::milliseconds(1000)));

        // Clock stepped back
        assert!(DataStore::throttle(&mut last, t0, 1.0));
    }

    #[test]
    fn test_cycle_start() {
        let mut ds = DataStore::default();
        let t0 = Utc::now();

        ds.status_sent = true;
        ds.cycle_start(t0);
        assert!(!ds.status_sent);
        assert!(ds.frame_report().is_none());

        ds.cycle_start(t0 + Duration::milliseconds(1500));
        assert_eq!(ds.start_time, Some(t0));
        assert_eq!(ds.elapsed_s(), 1.5);
    }
}
