//! # AOG Executable Parameters
//!
//! This module provide parameters for the camera module executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::net::NetParams;
use serde::Deserialize;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Deserialize, Debug, Clone)]
pub struct AogExecParams {

    /// Width of the camera frames and display.
    ///
    /// Units: pixels
    pub frame_width: u32,

    /// Height of the camera frames and display.
    ///
    /// Units: pixels
    pub frame_height: u32,

    /// Target period of one frame. With a camera which paces the loop itself
    /// this can be 0, in which case the loop never sleeps.
    ///
    /// Units: seconds
    pub cycle_period_s: f64,

    /// Detections with a lower score are discarded by the detector.
    pub detection_conf_threshold: f32,

    /// Width of the touch digitizer's raw coordinate range.
    pub touch_raw_width: u32,

    /// Height of the touch digitizer's raw coordinate range.
    pub touch_raw_height: u32,

    /// Number of touch samples logged with their raw and display coordinates
    /// after startup.
    pub num_logged_touches: u32,

    /// Minimum time between two logs of the received steering angle.
    ///
    /// Units: seconds
    pub angle_log_period_s: f64,

    /// Minimum time between two obstacle summary logs.
    ///
    /// Units: seconds
    pub obstacle_log_period_s: f64,

    /// Link to the steering controller
    pub net: NetParams,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_exec_params_from_toml() {
        let p: AogExecParams = util::params::from_str(r#"
            frame_width = 640
            frame_height = 480
            cycle_period_s = 0.0
            detection_conf_threshold = 0.5
            touch_raw_width = 640
            touch_raw_height = 480
            num_logged_touches = 5
            angle_log_period_s = 1.0
            obstacle_log_period_s = 2.0

            [net]
            status_peer_addr = "192.168.4.1:8888"
            angle_listen_addr = "0.0.0.0:8889"
            angle_recv_timeout_ms = 20
            max_datagram_len = 64
        "#).unwrap();

        assert_eq!(p.frame_width, 640);
        assert_eq!(p.net.angle_recv_timeout_ms, 20);
        assert_eq!(p.net.status_peer_addr, "192.168.4.1:8888");
    }
}
