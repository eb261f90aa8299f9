use super::Transport;
use crate::{data::Sample, error::TransportError};
use std::{
    io,
    net::{SocketAddr, ToSocketAddrs, UdpSocket},
};

/// Statsd transport over a connected, non-blocking UDP socket.
///
/// Every emission is rendered as a single statsd line and sent as its own datagram.  Nothing is
/// retried: a datagram that can't be handed to the kernel right away is reported as an error and
/// dropped.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    prefix: String,
}

impl UdpTransport {
    /// Connects to the collector at `address`, prefixing every metric key with `prefix`.
    pub fn connect<A: ToSocketAddrs>(address: A, prefix: &str) -> io::Result<UdpTransport> {
        let remote = address
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing"))?;

        let local: SocketAddr = if remote.is_ipv4() {
            ([0u8; 4], 0).into()
        } else {
            ([0u16; 8], 0).into()
        };

        let socket = UdpSocket::bind(local)?;
        socket.connect(remote)?;
        socket.set_nonblocking(true)?;

        Ok(UdpTransport {
            socket,
            prefix: prefix.to_owned(),
        })
    }

    /// Address of the collector this transport sends to.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> { self.socket.peer_addr() }

    pub fn prefix(&self) -> &str { &self.prefix }

    fn send(&self, sample: Sample<&str>, sample_rate: f32) -> Result<(), TransportError> {
        let line = sample.render(&self.prefix, sample_rate);
        let sent = self.socket.send(line.as_bytes())?;
        if sent != line.len() {
            return Err(TransportError::Truncated {
                sent,
                expected: line.len(),
            });
        }
        Ok(())
    }
}

impl Transport for UdpTransport {
    fn increment_by(&self, key: &str, amount: i64, sample_rate: f32) -> Result<(), TransportError> {
        self.send(Sample::Count(key, amount), sample_rate)
    }

    fn gauge(&self, key: &str, value: i64, sample_rate: f32) -> Result<(), TransportError> {
        self.send(Sample::Gauge(key, value), sample_rate)
    }

    fn timing(&self, key: &str, duration_ms: i64, sample_rate: f32) -> Result<(), TransportError> {
        self.send(Sample::Timing(key, duration_ms), sample_rate)
    }
}
