//! Client-side codec and connection core for the Minecraft Java Edition
//! wire protocol: cursor-tracked binary buffers, the NBT tagged-tree codec,
//! packet framing with per-state dispatch, and framed connections in both
//! async and blocking flavors.
//!
//! ## Example: server list ping
//!
//! ```rust,no_run
//! use mcnet::protocol::constants::PROTOCOL_VERSION;
//! use mcnet::protocol::packet::handshaking::{Handshake, NextState};
//! use mcnet::protocol::packet::status::StatusRequest;
//! use mcnet::protocol::packet::{ClientboundPacket, ProtocolState, ServerboundPacket};
//! use mcnet::transport::{Connection, ConnectionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = Connection::connect("127.0.0.1:25565", ConnectionConfig::new()).await?;
//!
//!     conn.write_packet(&ServerboundPacket::from(Handshake {
//!         protocol_version: PROTOCOL_VERSION,
//!         server_address: "127.0.0.1".to_owned(),
//!         server_port: 25565,
//!         next_state: NextState::Status,
//!     }))
//!     .await?;
//!     conn.set_state(ProtocolState::Status);
//!
//!     conn.write_packet(&ServerboundPacket::from(StatusRequest)).await?;
//!     if let ClientboundPacket::StatusResponse(status) = conn.read_packet().await? {
//!         println!("{}", status.json_response);
//!     }
//!     conn.close().await?;
//!     Ok(())
//! }
//! ```
pub mod error;
pub mod nbt;
pub mod protocol;
pub mod transport;

pub use error::McnetError;
pub use nbt::{NbtSchema, NbtTag, TagType};
pub use protocol::buffer::Buffer;
pub use protocol::packet::{
    ClientboundPacket, Packet, ProtocolState, ServerboundPacket, WirePacket,
};
pub use transport::{Connection, ConnectionConfig};
