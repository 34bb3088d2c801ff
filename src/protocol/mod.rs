//! Wire-level building blocks: the cursor-tracked [`buffer::Buffer`],
//! protocol [`constants`], and the [`packet`] layer (bodies, framing,
//! dispatch tables).

pub mod buffer;
pub mod constants;
pub mod packet;
