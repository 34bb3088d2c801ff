use crate::protocol::buffer::Buffer;
use crate::protocol::packet::{DecodeError, Direction, EncodeError, Packet, ProtocolState};

/// Opens the login sequence with the profile the client wants to join as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginStart {
    pub username: String,
    /// Profile UUID, present when the client knows it ahead of auth.
    pub player_uuid: Option<u128>,
}

impl Packet for LoginStart {
    const ID: i32 = 0x00;
    const STATE: ProtocolState = ProtocolState::Login;
    const DIRECTION: Direction = Direction::Serverbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_utf(&self.username)?;
        dst.write_bool(self.player_uuid.is_some());
        if let Some(uuid) = self.player_uuid {
            dst.write_uuid(uuid);
        }
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        let username = src.read_utf()?;
        let player_uuid = if src.read_bool()? {
            Some(src.read_uuid()?)
        } else {
            None
        };
        Ok(Self {
            username,
            player_uuid,
        })
    }
}

/// Server aborted the login; the reason is a JSON chat component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginDisconnect {
    pub reason: String,
}

impl Packet for LoginDisconnect {
    const ID: i32 = 0x00;
    const STATE: ProtocolState = ProtocolState::Login;
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

/// Key material for the encryption handshake.
///
/// This core only carries the packet; the key exchange and the encrypted
/// stream wrapper live with the transport collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptionRequest {
    pub server_id: String,
    pub public_key: Vec<u8>,
    pub verify_token: Vec<u8>,
}

impl Packet for EncryptionRequest {
    const ID: i32 = 0x01;
    const STATE: ProtocolState = ProtocolState::Login;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_utf(&self.server_id)?;
        dst.write_bytearray(&self.public_key)?;
        dst.write_bytearray(&self.verify_token)
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            server_id: src.read_utf()?,
            public_key: src.read_bytearray()?,
            verify_token: src.read_bytearray()?,
        })
    }
}

/// One signed profile property attached to a [`LoginSuccess`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    pub name: String,
    pub value: String,
    pub signature: Option<String>,
}

/// Login accepted; carries the authoritative profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub uuid: u128,
    pub username: String,
    pub properties: Vec<Property>,
}

impl Packet for LoginSuccess {
    const ID: i32 = 0x02;
    const STATE: ProtocolState = ProtocolState::Login;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_uuid(self.uuid);
        dst.write_utf(&self.username)?;
        if self.properties.len() > i32::MAX as usize {
            return Err(EncodeError::SpanTooLong {
                len: self.properties.len(),
                max: i32::MAX as usize,
            });
        }
        dst.write_varint(self.properties.len() as i32);
        for property in &self.properties {
            dst.write_utf(&property.name)?;
            dst.write_utf(&property.value)?;
            dst.write_bool(property.signature.is_some());
            if let Some(signature) = &property.signature {
                dst.write_utf(signature)?;
            }
        }
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        let uuid = src.read_uuid()?;
        let username = src.read_utf()?;
        let count = src.read_varint()?;
        if count < 0 {
            return Err(DecodeError::NegativeLength(i64::from(count)));
        }
        let mut properties = Vec::new();
        for _ in 0..count {
            let name = src.read_utf()?;
            let value = src.read_utf()?;
            let signature = if src.read_bool()? {
                Some(src.read_utf()?)
            } else {
                None
            };
            properties.push(Property {
                name,
                value,
                signature,
            });
        }
        Ok(Self {
            uuid,
            username,
            properties,
        })
    }
}

/// Announces the compression threshold.
///
/// Decodable so callers can observe it; this core never switches to
/// compressed framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetCompression {
    pub threshold: i32,
}

impl Packet for SetCompression {
    const ID: i32 = 0x03;
    const STATE: ProtocolState = ProtocolState::Login;
    const DIRECTION: Direction = Direction::Clientbound;

    fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
        dst.write_varint(self.threshold);
        Ok(())
    }

    fn decode_body(src: &mut Buffer) -> Result<Self, DecodeError> {
        Ok(Self {
            threshold: src.read_varint()?,
        })
    }
}
