//! Named Binary Tag codec and schema-guided conversion.
//!
//! [`NbtTag`] is the tagged tree, with a binary codec over
//! [`Buffer`](crate::protocol::buffer::Buffer). The [`schema`] module maps
//! tag trees to and from plain nested values, guided by an [`NbtSchema`]
//! when the exact numeric variants matter.

pub mod schema;
mod tag;

pub use schema::{from_value, schema_of, to_named_value, to_value, NbtConvertible, NbtSchema, SchemaError};
pub use tag::{read_named, read_payload, write_named, write_payload, NbtTag, TagType};
