mod error;
mod framing;
mod registry;

pub mod handshaking;
pub mod login;
pub mod play;
pub mod status;

pub use error::{DecodeError, EncodeError};
pub use framing::{read_packet, write_packet, WirePacket};
pub(crate) use framing::{decode_frame, encode_frame};
pub use registry::{
    generate_packet_map, ClientboundPacket, PacketMap, PacketSet, RegistryError, ServerboundPacket,
};

use crate::protocol::buffer::Buffer;

/// Which peer a packet travels towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server.
    Serverbound,
    /// Server to client.
    Clientbound,
}

/// Session-scoped mode that partitions the packet id space.
///
/// Packet ids are only unique within one `(Direction, ProtocolState)` pair,
/// so the state is part of every dispatch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtocolState {
    Handshaking,
    Status,
    Login,
    Play,
}

/// Trait implemented by all concrete packet body types.
///
/// Implementations encode/decode only the packet body; the outer length
/// prefix and the id varint are handled by the framing layer.
pub trait Packet: Sized {
    /// Wire id, unique within this packet's `(DIRECTION, STATE)` pair.
    const ID: i32;

    /// Protocol state this packet belongs to.
    const STATE: ProtocolState;

    /// Direction this packet travels in.
    const DIRECTION: Direction;

    /// Encode the body of this packet into the destination buffer.
    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError>;

    /// Decode the body of this packet from the source buffer.
    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError>;
}
