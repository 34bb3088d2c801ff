use std::collections::HashMap;

use thiserror::Error;

use crate::protocol::buffer::Buffer;
use crate::protocol::packet::handshaking::Handshake;
use crate::protocol::packet::login::{
    EncryptionRequest, LoginDisconnect, LoginStart, LoginSuccess, SetCompression,
};
use crate::protocol::packet::play::{
    ClientboundKeepAlive, ConfirmTeleport, JoinGame, PlayDisconnect, ServerboundKeepAlive,
};
use crate::protocol::packet::status::{PingRequest, PingResponse, StatusRequest, StatusResponse};
use crate::protocol::packet::{DecodeError, Direction, EncodeError, Packet, ProtocolState};

use super::framing::WirePacket;

/// Errors raised while building a [`PacketMap`].
///
/// These indicate a defect in the fixed packet table, not a runtime
/// condition, and callers should treat them as fatal.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("duplicate packet id {id:#04x} for {direction:?} {state:?}")]
    DuplicatePacketId {
        id: i32,
        direction: Direction,
        state: ProtocolState,
    },
}

type Decoder<P> = fn(&mut Buffer) -> Result<P, DecodeError>;

/// Lookup table from packet id to body decoder for one
/// `(direction, state)` pair.
///
/// Built by [`generate_packet_map`]; pure of any runtime state, so callers
/// may memoize one per pair.
#[derive(Debug)]
pub struct PacketMap<P> {
    direction: Direction,
    state: ProtocolState,
    decoders: HashMap<i32, Decoder<P>>,
}

impl<P> PacketMap<P> {
    fn new(direction: Direction, state: ProtocolState) -> Self {
        Self {
            direction,
            state,
            decoders: HashMap::new(),
        }
    }

    fn insert(&mut self, id: i32, decoder: Decoder<P>) -> Result<(), RegistryError> {
        if self.decoders.insert(id, decoder).is_some() {
            return Err(RegistryError::DuplicatePacketId {
                id,
                direction: self.direction,
                state: self.state,
            });
        }
        Ok(())
    }

    /// Direction this map was built for.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Protocol state this map was built for.
    pub fn state(&self) -> ProtocolState {
        self.state
    }

    /// Number of registered packet ids.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    pub fn contains_id(&self, id: i32) -> bool {
        self.decoders.contains_key(&id)
    }

    /// Resolve `id` and decode a packet body from `src`.
    ///
    /// An id with no entry fails with [`DecodeError::UnknownPacketId`]
    /// naming the id and the `(direction, state)` context.
    pub fn decode_body(&self, id: i32, src: &mut Buffer) -> Result<P, DecodeError> {
        match self.decoders.get(&id) {
            Some(decoder) => decoder(src),
            None => Err(DecodeError::UnknownPacketId {
                id,
                direction: self.direction,
                state: self.state,
            }),
        }
    }
}

/// A fixed, compile-time-enumerable set of packets for one direction.
pub trait PacketSet: Sized {
    /// Direction every packet in this set travels in.
    const DIRECTION: Direction;

    /// Build the id lookup table for one protocol state.
    fn packet_map(state: ProtocolState) -> Result<PacketMap<Self>, RegistryError>;
}

/// Enumerate the packet set for `P`'s direction, filter it down to `state`
/// and build the id lookup table.
pub fn generate_packet_map<P: PacketSet>(
    state: ProtocolState,
) -> Result<PacketMap<P>, RegistryError> {
    P::packet_map(state)
}

/// INTERNAL
/// Macro used to generate the per-direction packet enum, its dispatch
/// helpers and the `PacketSet` implementation that builds packet maps.
macro_rules! define_packet_set {
    (
        $(#[$meta:meta])*
        $enum_name:ident : $direction:expr ;
        $(
            $name:ident,
        )+
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq)]
        pub enum $enum_name {
            $(
                $name($name),
            )+
        }

        impl $enum_name {
            /// Return the wire id associated with the wrapped packet.
            pub fn id(&self) -> i32 {
                match self {
                    $(
                        Self::$name(_) => <$name as Packet>::ID,
                    )+
                }
            }

            /// Return the protocol state the wrapped packet belongs to.
            pub fn state(&self) -> ProtocolState {
                match self {
                    $(
                        Self::$name(_) => <$name as Packet>::STATE,
                    )+
                }
            }

            /// Encode only the body of the wrapped packet.
            pub fn encode_body(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
                match self {
                    $(
                        Self::$name(inner) => inner.encode_body(dst),
                    )+
                }
            }
        }

        $(
            impl From<$name> for $enum_name {
                fn from(packet: $name) -> Self {
                    Self::$name(packet)
                }
            }
        )+

        impl WirePacket for $enum_name {
            fn packet_id(&self) -> i32 {
                self.id()
            }

            fn encode_into(&self, dst: &mut Buffer) -> Result<(), EncodeError> {
                self.encode_body(dst)
            }
        }

        impl PacketSet for $enum_name {
            const DIRECTION: Direction = $direction;

            fn packet_map(state: ProtocolState) -> Result<PacketMap<Self>, RegistryError> {
                let mut map = PacketMap::new(Self::DIRECTION, state);
                $(
                    if <$name as Packet>::STATE == state {
                        map.insert(<$name as Packet>::ID, |src: &mut Buffer| {
                            <$name as Packet>::decode_body(src).map($enum_name::$name)
                        })?;
                    }
                )+
                Ok(map)
            }
        }
    };
}

define_packet_set! {
    /// Top-level enum over every packet the client can send.
    ServerboundPacket : Direction::Serverbound ;
    Handshake,
    StatusRequest,
    PingRequest,
    LoginStart,
    ConfirmTeleport,
    ServerboundKeepAlive,
}

define_packet_set! {
    /// Top-level enum over every packet the client can receive.
    ClientboundPacket : Direction::Clientbound ;
    StatusResponse,
    PingResponse,
    LoginDisconnect,
    EncryptionRequest,
    LoginSuccess,
    SetCompression,
    PlayDisconnect,
    ClientboundKeepAlive,
    JoinGame,
}
