use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::time;
use tracing::{debug, trace};

use crate::error::{closed_or_io, McnetError};
use crate::protocol::constants::{MAX_PACKET_LEN, VARINT_MAX_BYTES};
use crate::protocol::packet::{
    decode_frame, encode_frame, generate_packet_map, ClientboundPacket, DecodeError, PacketMap,
    ProtocolState, WirePacket,
};
use crate::transport::ConnectionConfig;

/// An async framed packet connection over any byte stream.
///
/// Tracks the current [`ProtocolState`] and dispatches inbound frames
/// through the clientbound packet table for that state. Outbound packets
/// are framed and written whole; inbound frames are staged in full before
/// any body decoding.
#[derive(Debug)]
pub struct Connection<S> {
    stream: S,
    state: ProtocolState,
    config: ConnectionConfig,
    // Lazily built per state, dropped on state change.
    map: Option<PacketMap<ClientboundPacket>>,
}

impl Connection<TcpStream> {
    /// Open a TCP connection and wrap it in the handshaking state.
    pub async fn connect(
        addr: impl ToSocketAddrs,
        config: ConnectionConfig,
    ) -> Result<Self, McnetError> {
        let stream = match time::timeout(config.connect_timeout, TcpStream::connect(addr)).await {
            Ok(stream) => stream?,
            Err(_) => return Err(McnetError::Timeout),
        };
        stream.set_nodelay(true)?;
        if let Ok(peer) = stream.peer_addr() {
            debug!(%peer, "connected");
        }
        Ok(Self::from_stream(stream, ProtocolState::Handshaking, config))
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    /// Wrap an already established stream.
    pub fn from_stream(stream: S, state: ProtocolState, config: ConnectionConfig) -> Self {
        Self {
            stream,
            state,
            config,
            map: None,
        }
    }

    /// Current protocol state.
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Switch protocol state, e.g. after sending a handshake.
    ///
    /// Takes effect for the next read; packets already in flight under the
    /// old state must be drained first.
    pub fn set_state(&mut self, state: ProtocolState) {
        if state != self.state {
            debug!(from = ?self.state, to = ?state, "protocol state change");
            self.state = state;
            self.map = None;
        }
    }

    /// Frame and write one packet, honoring the configured write deadline.
    pub async fn write_packet(&mut self, packet: &impl WirePacket) -> Result<(), McnetError> {
        let bytes = encode_frame(packet)?;
        let write_timeout = self.config.write_timeout;
        let stream = &mut self.stream;
        let write = async {
            stream.write_all(&bytes).await?;
            stream.flush().await
        };
        match write_timeout {
            Some(limit) => match time::timeout(limit, write).await {
                Ok(result) => result.map_err(closed_or_io)?,
                Err(_) => return Err(McnetError::Timeout),
            },
            None => write.await.map_err(closed_or_io)?,
        }
        trace!(id = packet.packet_id(), len = bytes.len(), "wrote packet");
        Ok(())
    }

    /// Read one framed packet and dispatch it for the current state.
    pub async fn read_packet(&mut self) -> Result<ClientboundPacket, McnetError> {
        let map = match self.map.take() {
            Some(map) => map,
            None => generate_packet_map::<ClientboundPacket>(self.state)?,
        };

        let frame = match self.config.read_timeout {
            Some(limit) => match time::timeout(limit, read_frame(&mut self.stream)).await {
                Ok(result) => result,
                Err(_) => {
                    self.map = Some(map);
                    return Err(McnetError::Timeout);
                }
            },
            None => read_frame(&mut self.stream).await,
        };
        let result = frame.and_then(|frame| decode_frame(frame, &map));
        self.map = Some(map);

        if let Ok(packet) = &result {
            trace!(id = packet.id(), state = ?self.state, "read packet");
        }
        result
    }

    /// Flush and shut down the write half.
    pub async fn close(&mut self) -> Result<(), McnetError> {
        self.stream.shutdown().await.map_err(closed_or_io)
    }

    /// Give up the connection and return the underlying stream.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

/// Read one whole frame (length prefix stripped) off the stream.
async fn read_frame<S: AsyncRead + Unpin>(stream: &mut S) -> Result<Vec<u8>, McnetError> {
    let declared = read_varint(stream).await?;
    if declared < 0 {
        return Err(DecodeError::NegativeLength(i64::from(declared)).into());
    }
    let len = declared as usize;
    if len > MAX_PACKET_LEN {
        return Err(DecodeError::LengthLimitExceeded {
            len,
            max: MAX_PACKET_LEN,
        }
        .into());
    }

    let mut frame = vec![0u8; len];
    stream.read_exact(&mut frame).await.map_err(closed_or_io)?;
    Ok(frame)
}

async fn read_varint<S: AsyncRead + Unpin>(stream: &mut S) -> Result<i32, McnetError> {
    let mut result: u32 = 0;
    for i in 0..VARINT_MAX_BYTES {
        let byte = stream.read_u8().await.map_err(closed_or_io)?;
        result |= u32::from(byte & 0x7F) << (7 * i);
        if byte & 0x80 == 0 {
            return Ok(result as i32);
        }
    }
    Err(DecodeError::VarIntTooLong {
        max: VARINT_MAX_BYTES,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::protocol::packet::play::ClientboundKeepAlive;
    use crate::protocol::packet::status::{PingResponse, StatusResponse};

    fn pair(state: ProtocolState) -> (Connection<tokio::io::DuplexStream>, tokio::io::DuplexStream)
    {
        let (near, far) = tokio::io::duplex(4096);
        (
            Connection::from_stream(near, state, ConnectionConfig::default()),
            far,
        )
    }

    #[tokio::test]
    async fn status_exchange_roundtrips() {
        let (mut client, far) = pair(ProtocolState::Status);
        let mut server = Connection::from_stream(far, ProtocolState::Status, ConnectionConfig::default());

        server
            .write_packet(&ClientboundPacket::from(StatusResponse {
                json_response: r#"{"description":"hi"}"#.to_owned(),
            }))
            .await
            .unwrap();
        server
            .write_packet(&ClientboundPacket::from(PingResponse { payload: 7 }))
            .await
            .unwrap();

        match client.read_packet().await.unwrap() {
            ClientboundPacket::StatusResponse(status) => {
                assert_eq!(status.json_response, r#"{"description":"hi"}"#);
            }
            other => panic!("unexpected packet: {}", other.id()),
        }
        match client.read_packet().await.unwrap() {
            ClientboundPacket::PingResponse(pong) => assert_eq!(pong.payload, 7),
            other => panic!("unexpected packet: {}", other.id()),
        }
    }

    #[tokio::test]
    async fn state_change_switches_the_dispatch_table() {
        let (mut client, far) = pair(ProtocolState::Status);
        let mut server = Connection::from_stream(far, ProtocolState::Play, ConnectionConfig::default());

        server
            .write_packet(&ClientboundPacket::from(ClientboundKeepAlive { id: 99 }))
            .await
            .unwrap();

        // Keep-alive id 0x23 is not a status packet.
        match client.read_packet().await {
            Err(McnetError::Decode(DecodeError::UnknownPacketId { id: 0x23, .. })) => {}
            other => panic!("expected UnknownPacketId, got {other:?}"),
        }

        server
            .write_packet(&ClientboundPacket::from(ClientboundKeepAlive { id: 100 }))
            .await
            .unwrap();
        client.set_state(ProtocolState::Play);
        match client.read_packet().await.unwrap() {
            ClientboundPacket::ClientboundKeepAlive(keep_alive) => assert_eq!(keep_alive.id, 100),
            other => panic!("unexpected packet: {}", other.id()),
        }
    }

    #[tokio::test]
    async fn idle_read_hits_the_deadline() {
        let (near, _far) = tokio::io::duplex(64);
        let config = ConnectionConfig::builder()
            .read_timeout(Some(Duration::from_millis(10)))
            .build();
        let mut client = Connection::from_stream(near, ProtocolState::Status, config);

        match client.read_packet().await {
            Err(McnetError::Timeout) => {}
            other => panic!("expected Timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn dropped_peer_is_connection_closed() {
        let (near, far) = tokio::io::duplex(64);
        drop(far);
        let mut client =
            Connection::from_stream(near, ProtocolState::Status, ConnectionConfig::default());

        match client.read_packet().await {
            Err(McnetError::ConnectionClosed) => {}
            other => panic!("expected ConnectionClosed, got {other:?}"),
        }
    }
}
