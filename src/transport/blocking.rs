use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};

use tracing::{debug, trace};

use crate::error::{closed_or_io, McnetError};
use crate::protocol::packet::{
    generate_packet_map, read_packet, write_packet, ClientboundPacket, PacketMap, ProtocolState,
    WirePacket,
};
use crate::transport::ConnectionConfig;

/// Blocking counterpart of [`Connection`](crate::transport::Connection).
///
/// Same surface, realized over `std::io` streams; deadlines are enforced
/// through the socket's read/write timeouts.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    state: ProtocolState,
    map: Option<PacketMap<ClientboundPacket>>,
}

impl Connection<TcpStream> {
    /// Open a TCP connection and wrap it in the handshaking state.
    pub fn connect(addr: impl ToSocketAddrs, config: ConnectionConfig) -> Result<Self, McnetError> {
        let mut last_err = None;
        for addr in addr.to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, config.connect_timeout) {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    stream.set_read_timeout(config.read_timeout)?;
                    stream.set_write_timeout(config.write_timeout)?;
                    debug!(peer = %addr, "connected");
                    return Ok(Self::from_stream(stream, ProtocolState::Handshaking));
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(match last_err {
            Some(err) => closed_or_io(err),
            None => io::Error::new(io::ErrorKind::InvalidInput, "no addresses resolved").into(),
        })
    }
}

impl<S: Read + Write> Connection<S> {
    /// Wrap an already established stream.
    pub fn from_stream(stream: S, state: ProtocolState) -> Self {
        Self {
            stream,
            state,
            map: None,
        }
    }

    /// Current protocol state.
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Switch protocol state, e.g. after sending a handshake.
    pub fn set_state(&mut self, state: ProtocolState) {
        if state != self.state {
            debug!(from = ?self.state, to = ?state, "protocol state change");
            self.state = state;
            self.map = None;
        }
    }

    /// Frame and write one packet.
    pub fn write_packet(&mut self, packet: &impl WirePacket) -> Result<(), McnetError> {
        write_packet(&mut self.stream, packet)?;
        trace!(id = packet.packet_id(), "wrote packet");
        Ok(())
    }

    /// Read one framed packet and dispatch it for the current state.
    pub fn read_packet(&mut self) -> Result<ClientboundPacket, McnetError> {
        let map = match self.map.take() {
            Some(map) => map,
            None => generate_packet_map::<ClientboundPacket>(self.state)?,
        };
        let result = read_packet(&mut self.stream, &map);
        self.map = Some(map);

        if let Ok(packet) = &result {
            trace!(id = packet.id(), state = ?self.state, "read packet");
        }
        result
    }

    /// Give up the connection and return the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}
