//! # Network Module
//!
//! This module provides a small abstraction over UDP sockets for the datagram
//! link to the steering controller. The link is connectionless: there is no
//! handshake, reconnect or retransmission, a datagram is either delivered or
//! dropped.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::debug;
use serde::Deserialize;
use std::{
    io::ErrorKind,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
    time::Duration,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Network parameters for the link.
#[derive(Deserialize, Debug, Clone)]
pub struct NetParams {
    /// Address of the steering controller which receives obstacle status datagrams, for example
    /// `"192.168.4.1:8888"`.
    pub status_peer_addr: String,

    /// Local address the steering angle datagrams are received on, for example
    /// `"0.0.0.0:8889"`.
    pub angle_listen_addr: String,

    /// Maximum time a receive may block for.
    ///
    /// Units: milliseconds
    pub angle_recv_timeout_ms: u64,

    /// Size of the receive buffer, longer datagrams are truncated.
    ///
    /// Units: bytes
    pub max_datagram_len: usize,
}

/// A UDP socket with an optional default peer.
pub struct DatagramSocket {
    socket: UdpSocket,

    peer: Option<SocketAddr>,

    recv_buf: Vec<u8>,
}

/// Options which can be set on a [`DatagramSocket`].
pub struct SocketOptions {
    /// Address the socket is bound to. Clients which only send can use `"0.0.0.0:0"`.
    pub bind_addr: String,

    /// Default destination for [`DatagramSocket::send_to_peer`].
    ///
    /// The default value is `None`.
    pub peer_addr: Option<String>,

    /// Maximum time before a receive returns with no data. `Some(0)` or `None` make receives
    /// fully non-blocking.
    ///
    /// The default value is `None`.
    pub recv_timeout_ms: Option<u64>,

    /// Receive buffer size in bytes.
    ///
    /// The default value is 64.
    pub recv_buf_len: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum NetError {
    #[error("Could not bind the socket to {0}: {1}")]
    BindError(String, std::io::Error),

    #[error("Could not resolve the address {0}: {1}")]
    AddrResolveError(String, std::io::Error),

    #[error("The address {0} did not resolve to any socket address")]
    AddrNotFound(String),

    #[error("Could not set the {0} socket option: {1}")]
    SocketOptionError(&'static str, std::io::Error),

    #[error("The socket has no peer to send to")]
    NoPeer,

    #[error("Could not send the datagram: {0}")]
    SendError(std::io::Error),

    #[error("Only {0} of {1} bytes were sent")]
    PartialSend(usize, usize),

    #[error("Could not recieve a datagram: {0}")]
    RecvError(std::io::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DatagramSocket {
    /// Create a new socket with the given options.
    pub fn new(options: SocketOptions) -> Result<Self, NetError> {
        let socket = UdpSocket::bind(&options.bind_addr)
            .map_err(|e| NetError::BindError(options.bind_addr.clone(), e))?;

        match options.recv_timeout_ms {
            Some(ms) if ms > 0 => socket
                .set_read_timeout(Some(Duration::from_millis(ms)))
                .map_err(|e| NetError::SocketOptionError("read_timeout", e))?,
            _ => socket
                .set_nonblocking(true)
                .map_err(|e| NetError::SocketOptionError("nonblocking", e))?,
        }

        let peer = match options.peer_addr {
            Some(ref a) => Some(resolve(a)?),
            None => None,
        };

        debug!(
            "Datagram socket bound to {:?}, peer {:?}",
            socket.local_addr().ok(),
            peer
        );

        Ok(Self {
            socket,
            peer,
            recv_buf: vec![0u8; options.recv_buf_len],
        })
    }

    /// Local address the socket is bound to.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.local_addr().ok()
    }

    /// The default peer of this socket, if one is set.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Send a text datagram to the default peer.
    pub fn send_to_peer(&self, msg: &str) -> Result<(), NetError> {
        let peer = self.peer.ok_or(NetError::NoPeer)?;
        self.send_to(msg, peer)
    }

    /// Send a text datagram to the given address.
    pub fn send_to(&self, msg: &str, addr: SocketAddr) -> Result<(), NetError> {
        let bytes = msg.as_bytes();
        let sent = self.socket.send_to(bytes, addr)
            .map_err(NetError::SendError)?;

        if sent != bytes.len() {
            return Err(NetError::PartialSend(sent, bytes.len()));
        }

        Ok(())
    }

    /// Receive a single datagram.
    ///
    /// Returns `Ok(None)` if no datagram arrived before the receive timeout elapsed.
    pub fn recv(&mut self) -> Result<Option<(&[u8], SocketAddr)>, NetError> {
        match self.socket.recv_from(&mut self.recv_buf) {
            Ok((len, addr)) => Ok(Some((&self.recv_buf[..len], addr))),
            Err(e) if is_no_data(&e) => Ok(None),
            Err(e) => Err(NetError::RecvError(e)),
        }
    }
}

impl Default for SocketOptions {
    fn default() -> Self {
        Self {
            bind_addr: String::from("0.0.0.0:0"),
            peer_addr: None,
            recv_timeout_ms: None,
            recv_buf_len: 64,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn resolve(addr: &str) -> Result<SocketAddr, NetError> {
    addr.to_socket_addrs()
        .map_err(|e| NetError::AddrResolveError(addr.to_string(), e))?
        .next()
        .ok_or_else(|| NetError::AddrNotFound(addr.to_string()))
}

/// Timed out receives are reported as `WouldBlock` on unix and `TimedOut` on windows.
fn is_no_data(e: &std::io::Error) -> bool {
    matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_loopback_datagram() {
        let mut rx = DatagramSocket::new(SocketOptions {
            bind_addr: "127.0.0.1:0".into(),
            recv_timeout_ms: Some(500),
            ..Default::default()
        })
        .unwrap();
        let rx_addr = rx.local_addr().unwrap();

        let tx = DatagramSocket::new(SocketOptions {
            bind_addr: "127.0.0.1:0".into(),
            peer_addr: Some(rx_addr.to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(tx.peer(), Some(rx_addr));

        tx.send_to_peer("ANGLE:1.5").unwrap();

        let (payload, from) = rx.recv().unwrap().expect("Expected a datagram");
        assert_eq!(payload, b"ANGLE:1.5");
        assert_eq!(Some(from), tx.local_addr());
    }

    #[test]
    fn test_no_data_and_no_peer() {
        let mut sock = DatagramSocket::new(SocketOptions {
            bind_addr: "127.0.0.1:0".into(),
            recv_timeout_ms: Some(10),
            ..Default::default()
        })
        .unwrap();

        assert!(matches!(sock.recv(), Ok(None)));
        assert!(matches!(sock.send_to_peer("x"), Err(NetError::NoPeer)));
    }
}
