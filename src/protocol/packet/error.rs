use thiserror::Error;

use crate::nbt::TagType;
use crate::protocol::packet::{Direction, ProtocolState};

/// Errors that may occur while encoding protocol values or packet bodies.
#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("string of {len} bytes exceeds the {max} byte limit")]
    StringTooLong { len: usize, max: usize },

    #[error("byte span of {len} elements exceeds the {max} element limit")]
    SpanTooLong { len: usize, max: usize },

    #[error("list declares element type {declared:?} but holds a {found:?} tag")]
    HeterogeneousList { declared: TagType, found: TagType },

    #[error("frame of {len} bytes exceeds the {max} byte limit")]
    FrameTooLong { len: usize, max: usize },
}

/// Errors that may occur while decoding protocol values, NBT trees or
/// framed packets.
///
/// This type is kept small and generic so the buffer primitives, the NBT
/// codec and the packet framing can all share it.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The buffer did not contain enough bytes to decode the requested value.
    #[error("unexpected end of buffer, not enough bytes to read requested type")]
    UnexpectedEof,

    /// A variable-length integer was still continuing at its byte cap.
    #[error("varint continued past its {max} byte cap")]
    VarIntTooLong { max: usize },

    /// A length prefix declared more bytes than the protocol allows.
    #[error("declared length {len} exceeds the {max} byte limit")]
    LengthLimitExceeded { len: usize, max: usize },

    /// A signed length prefix was negative.
    #[error("declared length is negative: {0}")]
    NegativeLength(i64),

    /// A string payload was not valid UTF-8.
    #[error("invalid utf-8 in string payload: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// A leading NBT type byte did not match any known tag variant.
    #[error("unknown NBT tag type byte: {0:#04x}")]
    InvalidTagType(u8),

    /// A decoded NBT tree nested deeper than the protocol cap.
    #[error("tag nesting depth exceeds the {max} level limit")]
    DepthLimitExceeded { max: usize },

    /// A handshake requested a state the protocol cannot switch into.
    #[error("invalid next-state value in handshake: {0}")]
    InvalidNextState(i32),

    /// A framed packet id had no entry in the map for its context.
    ///
    /// Callers should treat this as potentially recoverable (skip or log);
    /// every other decode error aborts the exchange.
    #[error("unknown packet id {id:#04x} for {direction:?} {state:?}")]
    UnknownPacketId {
        id: i32,
        direction: Direction,
        state: ProtocolState,
    },

    /// Bytes were left over after a framed body decoded, which indicates a
    /// field-layout mismatch (typically protocol-version skew).
    #[error("{remaining} trailing bytes left after decoding packet body")]
    TrailingData { remaining: usize },
}
