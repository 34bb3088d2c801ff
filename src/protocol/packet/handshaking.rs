use crate::protocol::buffer::Buffer;
use crate::protocol::packet::{DecodeError, Direction, EncodeError, Packet, ProtocolState};

/// State the server should switch the connection into after the handshake.
///
/// Only Status and Login are admissible here; Play is reached through the
/// login sequence, never directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    Status,
    Login,
}

impl NextState {
    pub fn id(self) -> i32 {
        match self {
            Self::Status => 1,
            Self::Login => 2,
        }
    }

    pub fn from_id(id: i32) -> Result<Self, DecodeError> {
        match id {
            1 => Ok(Self::Status),
            2 => Ok(Self::Login),
            other => Err(DecodeError::InvalidNextState(other)),
        }
    }
}

impl From<NextState> for ProtocolState {
    fn from(next: NextState) -> Self {
        match next {
            NextState::Status => Self::Status,
            NextState::Login => Self::Login,
        }
    }
}

/// First packet of every session; announces the protocol version and the
/// state the client intends to enter.
#[derive(Debug, Clone, PartialEq)]
pub struct Handshake {
    pub protocol_version: i32,
    pub server_address: String,
    pub server_port: u16,
    pub next_state: NextState,
}

impl Packet for Handshake {
    const ID: i32 = 0x00;
    const STATE: ProtocolState = ProtocolState::Handshaking;
    const DIRECTION: Direction = Direction::Serverbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_varint(self.protocol_version);
        dst.write_utf(&self.server_address)?;
        dst.write_u16(self.server_port);
        dst.write_varint(self.next_state.id());
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            protocol_version: src.read_varint()?,
            server_address: src.read_utf()?,
            server_port: src.read_u16()?,
            next_state: NextState::from_id(src.read_varint()?)?,
        })
    }
}
