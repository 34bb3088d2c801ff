use std::io::{Read, Write};

use bytes::Bytes;

use crate::error::{closed_or_io, McnetError};
use crate::protocol::buffer::Buffer;
use crate::protocol::constants::{MAX_PACKET_LEN, VARINT_MAX_BYTES};
use crate::protocol::packet::registry::PacketMap;
use crate::protocol::packet::{DecodeError, EncodeError};

/// A message that can be framed onto the wire: a numeric id plus an
/// encodable body.
///
/// Implemented by the generated direction enums; custom frames (e.g. for
/// tests or proxies) can implement it directly.
pub trait WirePacket {
    /// Wire id written after the outer length prefix.
    fn packet_id(&self) -> i32;

    /// Encode the packet body into the destination buffer.
    fn encode_into(&self, dst: &mut Buffer) -> Result<(), EncodeError>;
}

/// Build the full outer frame for a packet:
/// `varint(len)` + `varint(id)` + body.
///
/// Frames above [`MAX_PACKET_LEN`] fail here, mirroring the read-side cap,
/// so an oversized body is never put on the wire for the peer to reject.
pub(crate) fn encode_frame(packet: &impl WirePacket) -> Result<Bytes, EncodeError> {
    let mut body = Buffer::new();
    packet.encode_into(&mut body)?;

    let mut frame = Buffer::new();
    frame.write_varint(packet.packet_id());
    frame.write_bytes(&body.into_bytes());
    if frame.len() > MAX_PACKET_LEN {
        return Err(EncodeError::FrameTooLong {
            len: frame.len(),
            max: MAX_PACKET_LEN,
        });
    }

    let mut out = Buffer::new();
    out.write_varint(frame.len() as i32);
    out.write_bytes(&frame.into_bytes());
    Ok(out.into_bytes())
}

/// Decode one frame body (id varint + packet body) that has already been
/// read off the stream in full.
///
/// The body must be consumed exactly; leftover bytes indicate a field-layout
/// mismatch and surface as [`DecodeError::TrailingData`].
pub(crate) fn decode_frame<P>(frame: Vec<u8>, map: &PacketMap<P>) -> Result<P, McnetError> {
    let mut buf = Buffer::from(frame);
    let id = buf.read_varint()?;
    let packet = map.decode_body(id, &mut buf)?;
    if buf.remaining() != 0 {
        return Err(DecodeError::TrailingData {
            remaining: buf.remaining(),
        }
        .into());
    }
    Ok(packet)
}

/// Serialize `packet` and write the framed form to `sink`.
pub fn write_packet<W: Write>(sink: &mut W, packet: &impl WirePacket) -> Result<(), McnetError> {
    let bytes = encode_frame(packet)?;
    sink.write_all(&bytes).map_err(closed_or_io)?;
    sink.flush().map_err(closed_or_io)?;
    Ok(())
}

/// Read one framed packet from `source` and resolve it through `map`.
///
/// The whole frame is staged into a [`Buffer`] before any body decoding, so
/// a short stream surfaces as [`McnetError::ConnectionClosed`] and never as
/// a half-decoded packet.
pub fn read_packet<R: Read, P>(source: &mut R, map: &PacketMap<P>) -> Result<P, McnetError> {
    let declared = read_varint_from(source)?;
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
    source.read_exact(&mut frame).map_err(closed_or_io)?;
    decode_frame(frame, map)
}

/// Read a varint length prefix byte-by-byte off a raw stream.
fn read_varint_from<R: Read>(source: &mut R) -> Result<i32, McnetError> {
    let mut result: u32 = 0;
    for i in 0..VARINT_MAX_BYTES {
        let mut byte = [0u8; 1];
        source.read_exact(&mut byte).map_err(closed_or_io)?;
        result |= u32::from(byte[0] & 0x7F) << (7 * i);
        if byte[0] & 0x80 == 0 {
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
    use super::*;
    use crate::protocol::packet::status::{PingRequest, StatusRequest, StatusResponse};
    use crate::protocol::packet::{
        generate_packet_map, ClientboundPacket, Packet, ProtocolState, ServerboundPacket,
    };

    #[test]
    fn empty_body_packet_frames_to_two_bytes() {
        let mut sink = Buffer::new();
        write_packet(&mut sink, &ServerboundPacket::from(StatusRequest)).unwrap();
        assert_eq!(&sink.into_bytes()[..], b"\x01\x00");
    }

    #[test]
    fn frame_roundtrip_through_a_buffer() {
        let map = generate_packet_map::<ClientboundPacket>(ProtocolState::Status).unwrap();

        let mut wire = Buffer::new();
        write_packet(
            &mut wire,
            &ClientboundPacket::from(StatusResponse {
                json_response: r#"{"description":"A Minecraft Server"}"#.to_owned(),
            }),
        )
        .unwrap();

        match read_packet(&mut wire, &map).unwrap() {
            ClientboundPacket::StatusResponse(status) => {
                assert_eq!(
                    status.json_response,
                    r#"{"description":"A Minecraft Server"}"#
                );
            }
            other => panic!("unexpected packet variant: {}", other.id()),
        }
        assert_eq!(wire.remaining(), 0);
    }

    #[test]
    fn unknown_id_carries_the_lookup_context() {
        let map = generate_packet_map::<ClientboundPacket>(ProtocolState::Status).unwrap();

        // Frame with embedded id 99 and no body.
        let mut wire = Buffer::new();
        wire.write_varint(1);
        wire.write_varint(99);

        match read_packet(&mut wire, &map) {
            Err(McnetError::Decode(DecodeError::UnknownPacketId {
                id,
                direction,
                state,
            })) => {
                assert_eq!(id, 99);
                assert_eq!(direction, crate::protocol::packet::Direction::Clientbound);
                assert_eq!(state, ProtocolState::Status);
            }
            other => panic!("expected UnknownPacketId, got {other:?}"),
        }
    }

    #[test]
    fn trailing_bytes_after_body_are_rejected() {
        let map = generate_packet_map::<ClientboundPacket>(ProtocolState::Status).unwrap();

        // PingResponse body is 8 bytes; pad two extra inside the frame.
        let mut wire = Buffer::new();
        wire.write_varint(11);
        wire.write_varint(0x01);
        wire.write_i64(42);
        wire.write_u16(0xBEEF);

        match read_packet(&mut wire, &map) {
            Err(McnetError::Decode(DecodeError::TrailingData { remaining: 2 })) => {}
            other => panic!("expected TrailingData, got {other:?}"),
        }
    }

    #[test]
    fn truncated_source_is_connection_closed() {
        let map = generate_packet_map::<ClientboundPacket>(ProtocolState::Status).unwrap();

        // Declares a 9-byte frame but only 3 bytes follow.
        let mut wire = Buffer::new();
        wire.write_varint(9);
        wire.write_varint(0x01);
        wire.write_u16(0x0102);

        match read_packet(&mut wire, &map) {
            Err(McnetError::ConnectionClosed) => {}
            other => panic!("expected ConnectionClosed, got {other:?}"),
        }
    }

    #[test]
    fn oversized_frame_length_is_rejected_before_allocation() {
        let map = generate_packet_map::<ClientboundPacket>(ProtocolState::Status).unwrap();

        let mut wire = Buffer::new();
        wire.write_varint((MAX_PACKET_LEN + 1) as i32);

        match read_packet(&mut wire, &map) {
            Err(McnetError::Decode(DecodeError::LengthLimitExceeded { .. })) => {}
            other => panic!("expected LengthLimitExceeded, got {other:?}"),
        }
    }

    #[test]
    fn oversized_body_fails_to_frame() {
        use crate::protocol::packet::login::EncryptionRequest;

        let packet = ClientboundPacket::from(EncryptionRequest {
            server_id: String::new(),
            public_key: vec![0u8; MAX_PACKET_LEN],
            verify_token: Vec::new(),
        });

        let mut sink = Buffer::new();
        match write_packet(&mut sink, &packet) {
            Err(McnetError::Encode(EncodeError::FrameTooLong { len, max })) => {
                assert!(len > max);
                assert_eq!(max, MAX_PACKET_LEN);
            }
            other => panic!("expected FrameTooLong, got {other:?}"),
        }
        assert!(sink.is_empty());
    }

    #[test]
    fn serverbound_ping_roundtrip_via_map() {
        let map = generate_packet_map::<ServerboundPacket>(ProtocolState::Status).unwrap();

        let mut wire = Buffer::new();
        write_packet(
            &mut wire,
            &ServerboundPacket::from(PingRequest { payload: -5 }),
        )
        .unwrap();

        match read_packet(&mut wire, &map).unwrap() {
            ServerboundPacket::PingRequest(ping) => assert_eq!(ping.payload, -5),
            other => panic!("unexpected packet variant: {}", other.id()),
        }
        assert_eq!(<PingRequest as Packet>::ID, 0x01);
    }
}
