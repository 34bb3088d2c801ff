/// Maximum number of encoded bytes in a 32-bit varint.
pub const VARINT_MAX_BYTES: usize = 5;

/// Maximum number of encoded bytes in a 64-bit varlong.
pub const VARLONG_MAX_BYTES: usize = 10;

/// Maximum decodable byte length of a varint-prefixed UTF-8 string.
///
/// The protocol caps strings at 32767 UTF-16 code units; each unit can take
/// up to three bytes of UTF-8 on the wire.
pub const MAX_STRING_BYTES: usize = 32767 * 3;

/// Allocation guard for length-prefixed byte spans and NBT element counts.
/// A declared length above this fails before any allocation happens.
pub const MAX_BYTES: usize = 2 * 1024 * 1024;

/// Maximum accepted outer frame length (the notchian 3-byte-varint cap).
pub const MAX_PACKET_LEN: usize = 2_097_151;

/// Maximum nesting depth of a decoded NBT tree. Keeps the recursive decoder
/// on bounded stack no matter how deeply a hostile frame nests compounds.
pub const MAX_NBT_DEPTH: usize = 512;

/// Protocol version sent in the handshake (1.19.4).
pub const PROTOCOL_VERSION: i32 = 762;

/// Default server port for the Java Edition protocol.
pub const DEFAULT_PORT: u16 = 25565;
