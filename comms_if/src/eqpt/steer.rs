//! # Steering Controller Messages
//!
//! Text datagrams exchanged with the steering controller:
//!
//! - Outbound (camera module to controller):
//!   `OBSTACLE:<0|1>:COUNT:<n>:ANGLE:<angle with one decimal>`
//! - Inbound (controller to camera module): `ANGLE:<signed decimal>`

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Prefix of the inbound steering angle datagram.
pub const ANGLE_PREFIX: &str = "ANGLE:";

const OBSTACLE_TAG: &str = "OBSTACLE";
const COUNT_TAG: &str = "COUNT";
const ANGLE_TAG: &str = "ANGLE";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Obstacle status reported to the steering controller once per frame.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ObstacleStatus {
    /// True if at least one recognised object lies inside the corridor.
    pub has_obstacle: bool,

    /// Number of recognised objects inside the corridor.
    pub count: usize,

    /// The steering angle the corridor was computed with.
    ///
    /// Units: degrees
    pub steering_angle_deg: f64,
}

/// Steering angle report sent by the steering controller.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct AngleReport {
    /// Units: degrees
    pub steering_angle_deg: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Reasons an inbound angle datagram is rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AngleParseError {
    #[error("The datagram is not valid UTF-8")]
    NonUtf8,

    #[error("Unrecognised datagram: {0:?}")]
    UnknownPrefix(String),

    #[error("Could not parse the angle value {0:?}")]
    InvalidAngle(String),
}

/// Reasons an obstacle status datagram is rejected.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum StatusParseError {
    #[error("The datagram is not valid UTF-8")]
    NonUtf8,

    #[error("Malformed obstacle status datagram: {0:?}")]
    Malformed(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ObstacleStatus {
    /// Encode the status as a datagram payload.
    pub fn to_datagram(&self) -> String {
        self.to_string()
    }

    /// Decode a status datagram, as the steering controller would.
    pub fn from_datagram(payload: &[u8]) -> Result<Self, StatusParseError> {
        let msg = std::str::from_utf8(payload)
            .map_err(|_| StatusParseError::NonUtf8)?
            .trim();

        let malformed = || StatusParseError::Malformed(msg.to_string());

        let fields: Vec<&str> = msg.split(':').collect();
        match fields.as_slice() {
            [OBSTACLE_TAG, flag, COUNT_TAG, count, ANGLE_TAG, angle] => {
                let has_obstacle = match *flag {
                    "0" => false,
                    "1" => true,
                    _ => return Err(malformed()),
                };
                let count = count.parse().map_err(|_| malformed())?;
                let steering_angle_deg = parse_finite(angle).ok_or_else(malformed)?;

                Ok(Self {
                    has_obstacle,
                    count,
                    steering_angle_deg,
                })
            }
            _ => Err(malformed()),
        }
    }
}

impl fmt::Display for ObstacleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{:.1}",
            OBSTACLE_TAG,
            if self.has_obstacle { 1 } else { 0 },
            COUNT_TAG,
            self.count,
            ANGLE_TAG,
            self.steering_angle_deg
        )
    }
}

impl AngleReport {
    /// Encode the report as a datagram payload.
    pub fn to_datagram(&self) -> String {
        format!("{}{}", ANGLE_PREFIX, self.steering_angle_deg)
    }

    /// Decode an angle datagram.
    ///
    /// Surrounding whitespace is ignored, both around the message and around
    /// the number. Non-finite values are rejected.
    pub fn from_datagram(payload: &[u8]) -> Result<Self, AngleParseError> {
        let msg = std::str::from_utf8(payload)
            .map_err(|_| AngleParseError::NonUtf8)?
            .trim();

        let value = msg
            .strip_prefix(ANGLE_PREFIX)
            .ok_or_else(|| AngleParseError::UnknownPrefix(msg.to_string()))?
            .trim();

        parse_finite(value)
            .map(|steering_angle_deg| Self { steering_angle_deg })
            .ok_or_else(|| AngleParseError::InvalidAngle(value.to_string()))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn parse_finite(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|v| v.is_finite())
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_status_format() {
        let status = ObstacleStatus {
            has_obstacle: true,
            count: 2,
            steering_angle_deg: 12.46,
        };
        assert_eq!(status.to_datagram(), "OBSTACLE:1:COUNT:2:ANGLE:12.5");

        let status = ObstacleStatus {
            has_obstacle: false,
            count: 0,
            steering_angle_deg: -7.0,
        };
        assert_eq!(status.to_datagram(), "OBSTACLE:0:COUNT:0:ANGLE:-7.0");
    }

    #[test]
    fn test_status_decode() {
        let status = ObstacleStatus::from_datagram(b"OBSTACLE:1:COUNT:3:ANGLE:-12.5").unwrap();
        assert!(status.has_obstacle);
        assert_eq!(status.count, 3);
        assert_eq!(status.steering_angle_deg, -12.5);

        assert!(ObstacleStatus::from_datagram(b"OBSTACLE:2:COUNT:3:ANGLE:0.0").is_err());
        assert!(ObstacleStatus::from_datagram(b"OBSTACLE:1:COUNT:-1:ANGLE:0.0").is_err());
        assert!(ObstacleStatus::from_datagram(b"ANGLE:0.0").is_err());
    }

    #[test]
    fn test_angle_decode() {
        assert_eq!(
            AngleReport::from_datagram(b"ANGLE:12.5"),
            Ok(AngleReport { steering_angle_deg: 12.5 })
        );
        assert_eq!(
            AngleReport::from_datagram(b" ANGLE: -30 \n"),
            Ok(AngleReport { steering_angle_deg: -30.0 })
        );
        assert_eq!(
            AngleReport::from_datagram(b"ANGLE:notanumber"),
            Err(AngleParseError::InvalidAngle("notanumber".into()))
        );
        assert_eq!(
            AngleReport::from_datagram(b"ANGLE:NaN"),
            Err(AngleParseError::InvalidAngle("NaN".into()))
        );
        assert_eq!(
            AngleReport::from_datagram(b"SPEED:3.0"),
            Err(AngleParseError::UnknownPrefix("SPEED:3.0".into()))
        );
        assert_eq!(
            AngleReport::from_datagram(&[0xff, 0xfe]),
            Err(AngleParseError::NonUtf8)
        );
    }
}
