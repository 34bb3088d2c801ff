use crate::nbt::{self, NbtTag};
use crate::protocol::buffer::Buffer;
use crate::protocol::packet::{DecodeError, Direction, EncodeError, Packet, ProtocolState};

/// Acknowledges a forced position update from the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmTeleport {
    pub teleport_id: i32,
}

impl Packet for ConfirmTeleport {
    const ID: i32 = 0x00;
    const STATE: ProtocolState = ProtocolState::Play;
    const DIRECTION: Direction = Direction::Serverbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_varint(self.teleport_id);
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            teleport_id: src.read_varint()?,
        })
    }
}

/// Echo of a [`ClientboundKeepAlive`]; must carry the same id back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerboundKeepAlive {
    pub id: i64,
}

impl Packet for ServerboundKeepAlive {
    const ID: i32 = 0x12;
    const STATE: ProtocolState = ProtocolState::Play;
    const DIRECTION: Direction = Direction::Serverbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_i64(self.id);
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            id: src.read_i64()?,
        })
    }
}

/// Server closed the play session; the reason is a JSON chat component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayDisconnect {
    pub reason: String,
}

impl Packet for PlayDisconnect {
    const ID: i32 = 0x1A;
    const STATE: ProtocolState = ProtocolState::Play;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_utf(&self.reason)
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            reason: src.read_utf()?,
        })
    }
}

/// Liveness probe from the server; must be echoed within the timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientboundKeepAlive {
    pub id: i64,
}

impl Packet for ClientboundKeepAlive {
    const ID: i32 = 0x23;
    const STATE: ProtocolState = ProtocolState::Play;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_i64(self.id);
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            id: src.read_i64()?,
        })
    }
}

/// First packet of the play state; the registry codec arrives as a
/// name-stripped NBT compound embedded in the body.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinGame {
    pub entity_id: i32,
    pub hardcore: bool,
    pub game_mode: u8,
    pub registry_codec: NbtTag,
}

impl Packet for JoinGame {
    const ID: i32 = 0x28;
    const STATE: ProtocolState = ProtocolState::Play;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_i32(self.entity_id);
        dst.write_bool(self.hardcore);
        dst.write_u8(self.game_mode);
        // Network NBT roots travel with an empty name.
        nbt::write_named(dst, "", &self.registry_codec)
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        let entity_id = src.read_i32()?;
        let hardcore = src.read_bool()?;
        let game_mode = src.read_u8()?;
        let (_, registry_codec) = nbt::read_named(src)?;
        Ok(Self {
            entity_id,
            hardcore,
            game_mode,
            registry_codec,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keep_alive_roundtrips_both_directions() {
        let mut buf = Buffer::new();
        ClientboundKeepAlive { id: -77 }.encode_body(&mut buf).unwrap();
        assert_eq!(ClientboundKeepAlive::decode_body(&mut buf).unwrap().id, -77);

        let mut buf = Buffer::new();
        ServerboundKeepAlive { id: -77 }.encode_body(&mut buf).unwrap();
        assert_eq!(ServerboundKeepAlive::decode_body(&mut buf).unwrap().id, -77);
    }

    #[test]
    fn confirm_teleport_roundtrip() {
        let mut buf = Buffer::new();
        ConfirmTeleport { teleport_id: 300 }
            .encode_body(&mut buf)
            .unwrap();
        assert_eq!(
            ConfirmTeleport::decode_body(&mut buf).unwrap().teleport_id,
            300
        );
    }

    #[test]
    fn join_game_roundtrip_with_registry_codec() {
        let registry_codec = NbtTag::compound([
            (
                "minecraft:dimension_type".to_owned(),
                NbtTag::compound([("height".to_owned(), NbtTag::Int(384))]),
            ),
            ("piglin_safe".to_owned(), NbtTag::Byte(1)),
        ]);
        let packet = JoinGame {
            entity_id: 12,
            hardcore: false,
            game_mode: 0,
            registry_codec,
        };

        let mut buf = Buffer::new();
        packet.encode_body(&mut buf).unwrap();
        let decoded = JoinGame::decode_body(&mut buf).unwrap();
        assert_eq!(decoded, packet);
        assert_eq!(buf.remaining(), 0);
    }
}
