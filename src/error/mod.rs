//! Crate-level error type.
//!
//! Module-local errors ([`DecodeError`], [`EncodeError`], [`RegistryError`],
//! [`SchemaError`]) stay precise at their layer; [`McnetError`] is the union
//! the transport surfaces to callers.

use std::io;

use thiserror::Error;

use crate::nbt::SchemaError;
use crate::protocol::packet::{DecodeError, EncodeError, RegistryError};

/// Any failure a connection or codec operation can surface.
#[derive(Error, Debug)]
pub enum McnetError {
    /// Underlying stream failure other than the mapped cases below.
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// Inbound bytes violated the wire format.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Outbound value cannot be represented on the wire.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// Packet table construction failed.
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Schema-guided value conversion failed.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Peer closed the stream mid-frame or before one started.
    #[error("connection closed by peer")]
    ConnectionClosed,

    /// A configured read or write deadline elapsed.
    #[error("operation timed out")]
    Timeout,
}

/// Maps stream-level errors onto the connection lifecycle: an exact read
/// cut short means the peer went away, a deadline error means the timeout
/// fired. Everything else stays an io error.
pub(crate) fn closed_or_io(err: io::Error) -> McnetError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => McnetError::ConnectionClosed,
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => McnetError::Timeout,
        _ => McnetError::Io(err),
    }
}
