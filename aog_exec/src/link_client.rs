//! # Link Client
//!
//! Datagram link to the steering controller. The obstacle status goes out
//! through [`StatusSender`], the steering angle comes in through
//! [`AngleReceiver`] and is held in [`SteeringState`].

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use log::{debug, warn};

use comms_if::{
    eqpt::steer::{AngleParseError, AngleReport, ObstacleStatus},
    net::{DatagramSocket, NetError, NetParams, SocketOptions},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Sends obstacle status datagrams to the steering controller.
pub struct StatusSender {
    socket: Option<DatagramSocket>,
}

/// Receives steering angle datagrams from the steering controller.
pub struct AngleReceiver {
    socket: DatagramSocket,
}

/// Last known good steering angle.
#[derive(Debug, Clone, Copy, Default)]
pub struct SteeringState {
    /// Units: degrees
    pub angle_deg: f64,

    /// Time the angle was last updated, `None` if no angle has been received.
    pub last_update: Option<DateTime<Utc>>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    #[error("Socket error: {0}")]
    SocketError(NetError),

    #[error("The link to the steering controller is not connected")]
    NotConnected,

    #[error("Could not send the status datagram: {0}")]
    SendError(NetError),

    #[error("Could not recieve an angle datagram: {0}")]
    RecvError(NetError),

    #[error("Could not parse the recieved angle datagram: {0}")]
    AngleParseError(AngleParseError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl StatusSender {
    /// Create a new status sender.
    ///
    /// Failing to create the socket is not fatal, the sender is created
    /// disconnected and every send is skipped.
    pub fn new(params: &NetParams) -> Self {
        let socket_options = SocketOptions {
            peer_addr: Some(params.status_peer_addr.clone()),
            ..Default::default()
        };

        let socket = match DatagramSocket::new(socket_options) {
            Ok(s) => Some(s),
            Err(e) => {
                warn!(
                    "Could not open the status link to {}, status will not be sent: {}",
                    params.status_peer_addr, e
                );
                None
            }
        };

        Self { socket }
    }

    /// A sender which never sends.
    pub fn disconnected() -> Self {
        Self { socket: None }
    }

    pub fn is_connected(&self) -> bool {
        self.socket.is_some()
    }

    /// Send the status to the steering controller.
    pub fn send_status(&self, status: &ObstacleStatus) -> Result<(), LinkError> {
        let socket = self.socket.as_ref().ok_or(LinkError::NotConnected)?;

        let msg = status.to_datagram();
        socket.send_to_peer(&msg).map_err(LinkError::SendError)?;

        debug!("Status sent: {}", msg);

        Ok(())
    }
}

impl AngleReceiver {
    /// Create a new angle receiver bound to the listen address.
    pub fn new(params: &NetParams) -> Result<Self, LinkError> {
        let socket_options = SocketOptions {
            bind_addr: params.angle_listen_addr.clone(),
            recv_timeout_ms: Some(params.angle_recv_timeout_ms),
            recv_buf_len: params.max_datagram_len,
            ..Default::default()
        };

        let socket = DatagramSocket::new(socket_options)
            .map_err(LinkError::SocketError)?;

        Ok(Self { socket })
    }

    /// Local address the receiver is bound to.
    pub fn local_addr(&self) -> Option<std::net::SocketAddr> {
        self.socket.local_addr()
    }

    /// Attempt to receive a single angle datagram.
    ///
    /// Blocks for at most the receive timeout. Returns `Ok(None)` if nothing
    /// arrived.
    pub fn receive_angle(&mut self) -> Result<Option<f64>, LinkError> {
        let (payload, _) = match self.socket.recv() {
            Ok(Some(d)) => d,
            Ok(None) => return Ok(None),
            Err(e) => return Err(LinkError::RecvError(e)),
        };

        AngleReport::from_datagram(payload)
            .map(|r| Some(r.steering_angle_deg))
            .map_err(LinkError::AngleParseError)
    }
}

impl SteeringState {
    /// Accept a newly received angle.
    pub fn update(&mut self, angle_deg: f64, now: DateTime<Utc>) {
        self.angle_deg = angle_deg;
        self.last_update = Some(now);
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use std::thread;
    use std::time::Duration;

    fn loopback_params() -> NetParams {
        NetParams {
            status_peer_addr: String::from("127.0.0.1:9"),
            angle_listen_addr: String::from("127.0.0.1:0"),
            angle_recv_timeout_ms: 200,
            max_datagram_len: 64,
        }
    }

    /// Send a datagram to the receiver from a fresh socket.
    fn send_raw(rx: &AngleReceiver, payload: &str) {
        let tx = DatagramSocket::new(SocketOptions {
            bind_addr: String::from("127.0.0.1:0"),
            ..Default::default()
        }).unwrap();
        tx.send_to(payload, rx.local_addr().unwrap()).unwrap();
    }

    /// Receive until something other than a timeout happens.
    fn recv(rx: &mut AngleReceiver) -> Result<Option<f64>, LinkError> {
        for _ in 0..10 {
            match rx.receive_angle() {
                Ok(None) => thread::sleep(Duration::from_millis(10)),
                r => return r,
            }
        }
        Ok(None)
    }

    #[test]
    fn test_receive_angle() {
        let mut rx = AngleReceiver::new(&loopback_params()).unwrap();
        let mut state = SteeringState::default();

        send_raw(&rx, "ANGLE:12.5");
        match recv(&mut rx) {
            Ok(Some(a)) => state.update(a, Utc::now()),
            r => panic!("Unexpected result {:?}", r),
        }
        assert_eq!(state.angle_deg, 12.5);
        assert!(state.last_update.is_some());

        // Invalid value keeps the previous angle
        send_raw(&rx, "ANGLE:notanumber");
        match recv(&mut rx) {
            Err(LinkError::AngleParseError(AngleParseError::InvalidAngle(_))) => (),
            r => panic!("Unexpected result {:?}", r),
        }
        assert_eq!(state.angle_deg, 12.5);

        send_raw(&rx, "SPEED:3.0");
        assert!(matches!(
            recv(&mut rx),
            Err(LinkError::AngleParseError(AngleParseError::UnknownPrefix(_)))
        ));

        send_raw(&rx, "  ANGLE: -7.25\n");
        assert_eq!(recv(&mut rx).unwrap(), Some(-7.25));
    }

    #[test]
    fn test_receive_nothing() {
        let mut rx = AngleReceiver::new(&NetParams {
            angle_recv_timeout_ms: 20,
            ..loopback_params()
        }).unwrap();

        assert_eq!(rx.receive_angle().unwrap(), None);
    }

    #[test]
    fn test_send_status() {
        let mut peer = DatagramSocket::new(SocketOptions {
            bind_addr: String::from("127.0.0.1:0"),
            recv_timeout_ms: Some(500),
            ..Default::default()
        }).unwrap();

        let params = NetParams {
            status_peer_addr: peer.local_addr().unwrap().to_string(),
            ..loopback_params()
        };
        let tx = StatusSender::new(&params);
        assert!(tx.is_connected());

        tx.send_status(&ObstacleStatus {
            has_obstacle: true,
            count: 2,
            steering_angle_deg: -3.04,
        }).unwrap();

        let (payload, _) = peer.recv().unwrap().unwrap();
        assert_eq!(payload, b"OBSTACLE:1:COUNT:2:ANGLE:-3.0");
    }

    #[test]
    fn test_disconnected_sender() {
        let tx = StatusSender::disconnected();
        assert!(!tx.is_connected());
        assert!(matches!(
            tx.send_status(&ObstacleStatus {
                has_obstacle: false,
                count: 0,
                steering_angle_deg: 0.0,
            }),
            Err(LinkError::NotConnected)
        ));

        // An unresolvable peer leaves the sender disconnected
        let tx = StatusSender::new(&NetParams {
            status_peer_addr: String::from("not an address"),
            ..loopback_params()
        });
        assert!(!tx.is_connected());
    }
}
