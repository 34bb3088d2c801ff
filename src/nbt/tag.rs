use crate::protocol::buffer::Buffer;
use crate::protocol::constants::{MAX_BYTES, MAX_NBT_DEPTH};
use crate::protocol::packet::{DecodeError, EncodeError};

/// The twelve NBT wire type ids plus the End marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagType {
    End,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
    ByteArray,
    String,
    List,
    Compound,
    IntArray,
    LongArray,
}

impl TagType {
    /// Wire id byte for this type.
    pub fn id(self) -> u8 {
        match self {
            Self::End => 0,
            Self::Byte => 1,
            Self::Short => 2,
            Self::Int => 3,
            Self::Long => 4,
            Self::Float => 5,
            Self::Double => 6,
            Self::ByteArray => 7,
            Self::String => 8,
            Self::List => 9,
            Self::Compound => 10,
            Self::IntArray => 11,
            Self::LongArray => 12,
        }
    }

    /// Resolve a wire id byte, rejecting anything outside the closed set.
    pub fn from_id(id: u8) -> Result<Self, DecodeError> {
        Ok(match id {
            0 => Self::End,
            1 => Self::Byte,
            2 => Self::Short,
            3 => Self::Int,
            4 => Self::Long,
            5 => Self::Float,
            6 => Self::Double,
            7 => Self::ByteArray,
            8 => Self::String,
            9 => Self::List,
            10 => Self::Compound,
            11 => Self::IntArray,
            12 => Self::LongArray,
            other => return Err(DecodeError::InvalidTagType(other)),
        })
    }
}

/// A node of the recursive, self-describing tagged binary tree format used
/// for structured payloads.
///
/// Leaves hold fixed-width values; `List` is a homogeneous sequence with a
/// declared element type (End when empty); `Compound` is an ordered,
/// name-unique mapping terminated on the wire by an End byte instead of a
/// count. NBT strings and names use an unsigned 16-bit big-endian length
/// prefix, distinct from the varint-prefixed strings of the packet layer.
#[derive(Debug, Clone, PartialEq)]
pub enum NbtTag {
    End,
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    ByteArray(Vec<i8>),
    String(String),
    List {
        element: TagType,
        items: Vec<NbtTag>,
    },
    Compound(Vec<(String, NbtTag)>),
    IntArray(Vec<i32>),
    LongArray(Vec<i64>),
}

impl NbtTag {
    /// Wire type of this tag.
    pub fn tag_type(&self) -> TagType {
        match self {
            Self::End => TagType::End,
            Self::Byte(_) => TagType::Byte,
            Self::Short(_) => TagType::Short,
            Self::Int(_) => TagType::Int,
            Self::Long(_) => TagType::Long,
            Self::Float(_) => TagType::Float,
            Self::Double(_) => TagType::Double,
            Self::ByteArray(_) => TagType::ByteArray,
            Self::String(_) => TagType::String,
            Self::List { .. } => TagType::List,
            Self::Compound(_) => TagType::Compound,
            Self::IntArray(_) => TagType::IntArray,
            Self::LongArray(_) => TagType::LongArray,
        }
    }

    /// Build a compound, keeping the last entry when a name repeats so the
    /// name-uniqueness invariant holds by construction.
    pub fn compound<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, NbtTag)>,
    {
        let mut unique: Vec<(String, NbtTag)> = Vec::new();
        for (name, tag) in entries {
            match unique.iter_mut().find(|(existing, _)| *existing == name) {
                Some(slot) => slot.1 = tag,
                None => unique.push((name, tag)),
            }
        }
        Self::Compound(unique)
    }

    /// Build a list from items, deriving the declared element type from the
    /// first item (End when empty).
    pub fn list(items: Vec<NbtTag>) -> Self {
        let element = items.first().map_or(TagType::End, NbtTag::tag_type);
        Self::List { element, items }
    }

    /// Look up a compound entry by name.
    pub fn get(&self, name: &str) -> Option<&NbtTag> {
        match self {
            Self::Compound(entries) => entries
                .iter()
                .find(|(entry, _)| entry == name)
                .map(|(_, tag)| tag),
            _ => None,
        }
    }
}

/// Write a tag in its named form: type id byte, 16-bit-BE-length-prefixed
/// name, payload. End tags never carry a name.
pub fn write_named(dst: &mut Buffer, name: &str, tag: &NbtTag) -> Result<(), EncodeError> {
    dst.write_u8(tag.tag_type().id());
    if tag.tag_type() == TagType::End {
        return Ok(());
    }
    write_nbt_string(dst, name)?;
    write_payload(dst, tag)
}

/// Read a named tag, mirroring [`write_named`] exactly.
pub fn read_named(src: &mut Buffer) -> Result<(String, NbtTag), DecodeError> {
    let ty = TagType::from_id(src.read_u8()?)?;
    if ty == TagType::End {
        return Ok((String::new(), NbtTag::End));
    }
    let name = read_nbt_string(src)?;
    let tag = read_payload(src, ty)?;
    Ok((name, tag))
}

/// Write only the payload of a tag (the form list elements use).
pub fn write_payload(dst: &mut Buffer, tag: &NbtTag) -> Result<(), EncodeError> {
    match tag {
        NbtTag::End => Ok(()),
        NbtTag::Byte(v) => {
            dst.write_i8(*v);
            Ok(())
        }
        NbtTag::Short(v) => {
            dst.write_i16(*v);
            Ok(())
        }
        NbtTag::Int(v) => {
            dst.write_i32(*v);
            Ok(())
        }
        NbtTag::Long(v) => {
            dst.write_i64(*v);
            Ok(())
        }
        NbtTag::Float(v) => {
            dst.write_f32(*v);
            Ok(())
        }
        NbtTag::Double(v) => {
            dst.write_f64(*v);
            Ok(())
        }
        NbtTag::ByteArray(values) => {
            write_count(dst, values.len())?;
            for v in values {
                dst.write_i8(*v);
            }
            Ok(())
        }
        NbtTag::String(s) => write_nbt_string(dst, s),
        NbtTag::List { element, items } => {
            dst.write_u8(element.id());
            write_count(dst, items.len())?;
            for item in items {
                if item.tag_type() != *element {
                    return Err(EncodeError::HeterogeneousList {
                        declared: *element,
                        found: item.tag_type(),
                    });
                }
                write_payload(dst, item)?;
            }
            Ok(())
        }
        NbtTag::Compound(entries) => {
            for (name, entry) in entries {
                write_named(dst, name, entry)?;
            }
            dst.write_u8(TagType::End.id());
            Ok(())
        }
        NbtTag::IntArray(values) => {
            write_count(dst, values.len())?;
            for v in values {
                dst.write_i32(*v);
            }
            Ok(())
        }
        NbtTag::LongArray(values) => {
            write_count(dst, values.len())?;
            for v in values {
                dst.write_i64(*v);
            }
            Ok(())
        }
    }
}

/// Read a payload of the given type.
///
/// A list's declared element type is read once and trusted for every
/// element payload, matching the upstream decoder. Nesting beyond
/// [`MAX_NBT_DEPTH`] levels is [`DecodeError::DepthLimitExceeded`], so a
/// hostile frame cannot drive the recursion off the stack.
pub fn read_payload(src: &mut Buffer, ty: TagType) -> Result<NbtTag, DecodeError> {
    read_payload_at(src, ty, 0)
}

fn read_payload_at(src: &mut Buffer, ty: TagType, depth: usize) -> Result<NbtTag, DecodeError> {
    if depth > MAX_NBT_DEPTH {
        return Err(DecodeError::DepthLimitExceeded {
            max: MAX_NBT_DEPTH,
        });
    }
    Ok(match ty {
        TagType::End => NbtTag::End,
        TagType::Byte => NbtTag::Byte(src.read_i8()?),
        TagType::Short => NbtTag::Short(src.read_i16()?),
        TagType::Int => NbtTag::Int(src.read_i32()?),
        TagType::Long => NbtTag::Long(src.read_i64()?),
        TagType::Float => NbtTag::Float(src.read_f32()?),
        TagType::Double => NbtTag::Double(src.read_f64()?),
        TagType::ByteArray => {
            let count = read_count(src)?;
            let bytes = src.read_bytes(count)?;
            NbtTag::ByteArray(bytes.into_iter().map(|b| b as i8).collect())
        }
        TagType::String => NbtTag::String(read_nbt_string(src)?),
        TagType::List => {
            let element = TagType::from_id(src.read_u8()?)?;
            let count = read_count(src)?;
            // End elements carry no payload bytes, so a nonzero count would
            // let a few bytes of input materialize an arbitrarily large
            // tree. Every other element type consumes at least one byte.
            if element == TagType::End && count > 0 {
                return Err(DecodeError::InvalidTagType(TagType::End.id()));
            }
            if count > src.remaining() {
                return Err(DecodeError::UnexpectedEof);
            }
            let mut items = Vec::new();
            for _ in 0..count {
                items.push(read_payload_at(src, element, depth + 1)?);
            }
            NbtTag::List { element, items }
        }
        TagType::Compound => {
            let mut entries: Vec<(String, NbtTag)> = Vec::new();
            loop {
                let entry_ty = TagType::from_id(src.read_u8()?)?;
                if entry_ty == TagType::End {
                    break;
                }
                let name = read_nbt_string(src)?;
                let tag = read_payload_at(src, entry_ty, depth + 1)?;
                // Last writer wins, keeping names unique.
                match entries.iter_mut().find(|(existing, _)| *existing == name) {
                    Some(slot) => slot.1 = tag,
                    None => entries.push((name, tag)),
                }
            }
            NbtTag::Compound(entries)
        }
        TagType::IntArray => {
            let count = read_count(src)?;
            if count * 4 > src.remaining() {
                return Err(DecodeError::UnexpectedEof);
            }
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(src.read_i32()?);
            }
            NbtTag::IntArray(values)
        }
        TagType::LongArray => {
            let count = read_count(src)?;
            if count * 8 > src.remaining() {
                return Err(DecodeError::UnexpectedEof);
            }
            let mut values = Vec::with_capacity(count);
            for _ in 0..count {
                values.push(src.read_i64()?);
            }
            NbtTag::LongArray(values)
        }
    })
}

fn write_nbt_string(dst: &mut Buffer, s: &str) -> Result<(), EncodeError> {
    if s.len() > u16::MAX as usize {
        return Err(EncodeError::StringTooLong {
            len: s.len(),
            max: u16::MAX as usize,
        });
    }
    dst.write_u16(s.len() as u16);
    dst.write_bytes(s.as_bytes());
    Ok(())
}

fn read_nbt_string(src: &mut Buffer) -> Result<String, DecodeError> {
    let len = usize::from(src.read_u16()?);
    let bytes = src.read_bytes(len)?;
    let text = std::str::from_utf8(&bytes)?;
    Ok(text.to_owned())
}

/// Write a signed 32-bit element count.
fn write_count(dst: &mut Buffer, len: usize) -> Result<(), EncodeError> {
    if len > i32::MAX as usize {
        return Err(EncodeError::SpanTooLong {
            len,
            max: i32::MAX as usize,
        });
    }
    dst.write_i32(len as i32);
    Ok(())
}

/// Read a signed 32-bit element count, guarded before any allocation.
fn read_count(src: &mut Buffer) -> Result<usize, DecodeError> {
    let declared = src.read_i32()?;
    if declared < 0 {
        return Err(DecodeError::NegativeLength(i64::from(declared)));
    }
    let count = declared as usize;
    if count > MAX_BYTES {
        return Err(DecodeError::LengthLimitExceeded {
            len: count,
            max: MAX_BYTES,
        });
    }
    Ok(count)
}
