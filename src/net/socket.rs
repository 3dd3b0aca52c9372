//! Group-tagged UDP socket: the crate's stand-in for the source's
//! ZeroMQ RADIO/DISH draft sockets — no maintained Rust
//! binding exposes the draft API, so this crate goes one layer down and
//! builds the same "publish to a named group, subscribe by group" contract
//! directly on `socket2`).
//!
//! Framing is `[group_len: u8][group_bytes][payload]`. RADIO sends one
//! datagram per message, already tagged; DISH receives every datagram
//! addressed to the multicast group and drops any whose tag doesn't match
//! one it has joined, exactly mirroring `ZeroMQSocket::send` /
//! `receive_with_group` in the source's messaging adapter.

use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, UdpSocket};
use std::time::Duration;

use socket2::{Domain, Protocol, Socket as Socket2, Type};

use crate::error::SocketError;

const MAX_GROUP_LEN: usize = 16;
const MAX_DATAGRAM: usize = 2048;

/// RADIO role: connects to one multicast (or loopback, in development)
/// destination and sends group-tagged datagrams.
///
/// Built through `socket2` for the setsockopt calls std's `UdpSocket`
/// doesn't expose (multicast TTL, explicit buffer sizing), then handed off
/// to a plain `std::net::UdpSocket` for the actual I/O.
pub struct RadioSocket {
    socket: UdpSocket,
    dest: SocketAddr,
    group: String,
}

impl RadioSocket {
    pub fn connect(group: &str, addr_port: &str) -> Result<Self, SocketError> {
        let dest: SocketAddr = addr_port
            .parse()
            .map_err(|_| SocketError::InvalidEndpoint(addr_port.to_string()))?;

        let raw = Socket2::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| SocketError::Connect { endpoint: addr_port.to_string(), source: e })?;
        raw.set_send_buffer_size(1 << 20)
            .map_err(|e| SocketError::Connect { endpoint: addr_port.to_string(), source: e })?;
        if let SocketAddr::V4(v4) = dest {
            if v4.ip().is_multicast() {
                raw.set_multicast_ttl_v4(8)
                    .map_err(|e| SocketError::Connect { endpoint: addr_port.to_string(), source: e })?;
            }
        }
        raw.connect(&dest.into())
            .map_err(|e| SocketError::Connect { endpoint: addr_port.to_string(), source: e })?;

        Ok(Self { socket: raw.into(), dest, group: group.to_string() })
    }

    /// Sends `payload` tagged with this socket's group. Non-blocking with
    /// respect to the caller's real-time budget: the kernel send buffer is
    /// sized generously above so this practically never blocks.
    pub fn send(&self, payload: &[u8]) -> Result<(), SocketError> {
        let mut framed = Vec::with_capacity(1 + self.group.len() + payload.len());
        framed.push(self.group.len() as u8);
        framed.extend_from_slice(self.group.as_bytes());
        framed.extend_from_slice(payload);

        self.socket.send(&framed).map_err(SocketError::Send)?;
        Ok(())
    }

    pub fn destination(&self) -> SocketAddr {
        self.dest
    }
}

/// DISH role: binds, optionally joins an IPv4 multicast group, and filters
/// incoming datagrams down to a single accepted group tag.
pub struct DishSocket {
    socket: UdpSocket,
    group: String,
}

impl DishSocket {
    pub fn bind(group: &str, addr_port: &str) -> Result<Self, SocketError> {
        let bind_addr: SocketAddr = addr_port
            .parse()
            .map_err(|_| SocketError::InvalidEndpoint(addr_port.to_string()))?;

        let raw = Socket2::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))
            .map_err(|e| SocketError::Bind { endpoint: addr_port.to_string(), source: e })?;
        raw.set_reuse_address(true)
            .map_err(|e| SocketError::Bind { endpoint: addr_port.to_string(), source: e })?;
        raw.set_recv_buffer_size(1 << 20)
            .map_err(|e| SocketError::Bind { endpoint: addr_port.to_string(), source: e })?;

        let SocketAddr::V4(v4) = bind_addr else {
            return Err(SocketError::InvalidEndpoint(addr_port.to_string()));
        };

        if v4.ip().is_multicast() {
            let any = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, v4.port());
            raw.bind(&any.into())
                .map_err(|e| SocketError::Bind { endpoint: addr_port.to_string(), source: e })?;
            raw.join_multicast_v4(v4.ip(), &Ipv4Addr::UNSPECIFIED)
                .map_err(|e| SocketError::Join { endpoint: addr_port.to_string(), source: e })?;
        } else {
            raw.bind(&bind_addr.into())
                .map_err(|e| SocketError::Bind { endpoint: addr_port.to_string(), source: e })?;
        }

        Ok(Self { socket: raw.into(), group: group.to_string() })
    }

    pub fn set_read_timeout(&self, timeout: Duration) -> Result<(), SocketError> {
        self.socket
            .set_read_timeout(Some(timeout))
            .map_err(|e| SocketError::Bind { endpoint: "read-timeout".to_string(), source: e })
    }

    /// Blocks up to the configured read timeout for one datagram addressed
    /// to this socket's group, discarding any datagram tagged for a
    /// different group. Returns `Ok(None)` on a plain timeout.
    pub fn recv(&self) -> Result<Option<Vec<u8>>, SocketError> {
        let mut buf = [0u8; MAX_DATAGRAM];
        let n = match self.socket.recv(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::TimedOut => {
                return Ok(None)
            }
            Err(e) => return Err(SocketError::Receive(e)),
        };

        let datagram = &buf[..n];
        if datagram.is_empty() {
            return Ok(None);
        }
        let tag_len = datagram[0] as usize;
        if tag_len > MAX_GROUP_LEN || datagram.len() < 1 + tag_len {
            return Ok(None);
        }
        let tag = &datagram[1..1 + tag_len];
        if tag != self.group.as_bytes() {
            return Ok(None);
        }
        Ok(Some(datagram[1 + tag_len..].to_vec()))
    }
}
