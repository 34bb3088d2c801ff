use std::io::{self, Read, Write};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::protocol::constants::{
    MAX_BYTES, MAX_STRING_BYTES, VARINT_MAX_BYTES, VARLONG_MAX_BYTES,
};
use crate::protocol::packet::{DecodeError, EncodeError};

/// An in-memory, cursor-tracked byte sequence with typed encode/decode
/// primitives.
///
/// Writes always append at the tail; reads consume from the cursor, which
/// only ever moves forward. Reading past the stored bytes is a
/// [`DecodeError::UnexpectedEof`], never a default value. All fixed-width
/// values use network byte order.
///
/// A `Buffer` also implements [`std::io::Read`] and [`std::io::Write`], so it
/// satisfies the same exact-read/exact-write contract as a live stream: it is
/// simply never short, and absence of bytes is immediately end-of-stream.
#[derive(Debug, Default, Clone)]
pub struct Buffer {
    data: BytesMut,
    cursor: usize,
}

impl Buffer {
    /// Creates an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of bytes stored, including already-consumed ones.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer holds no bytes at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of unread bytes left between the cursor and the tail.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    /// Consumes the buffer, returning every stored byte (read or not).
    pub fn into_bytes(self) -> Bytes {
        self.data.freeze()
    }

    /// Consume exactly `n` bytes, or fail without moving the cursor.
    fn take(&mut self, n: usize) -> Result<&[u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof);
        }
        let start = self.cursor;
        self.cursor += n;
        Ok(&self.data[start..start + n])
    }

    pub fn write_u8(&mut self, value: u8) {
        self.data.put_u8(value);
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn write_i8(&mut self, value: i8) {
        self.data.put_i8(value);
    }

    pub fn read_i8(&mut self) -> Result<i8, DecodeError> {
        Ok(self.take(1)?[0] as i8)
    }

    pub fn write_bool(&mut self, value: bool) {
        self.data.put_u8(u8::from(value));
    }

    /// Reads one byte; any nonzero value decodes as `true`.
    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.read_u8()? != 0)
    }

    pub fn write_u16(&mut self, value: u16) {
        self.data.put_u16(value);
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let mut bytes = self.take(2)?;
        Ok(bytes.get_u16())
    }

    pub fn write_i16(&mut self, value: i16) {
        self.data.put_i16(value);
    }

    pub fn read_i16(&mut self) -> Result<i16, DecodeError> {
        let mut bytes = self.take(2)?;
        Ok(bytes.get_i16())
    }

    pub fn write_u32(&mut self, value: u32) {
        self.data.put_u32(value);
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let mut bytes = self.take(4)?;
        Ok(bytes.get_u32())
    }

    pub fn write_i32(&mut self, value: i32) {
        self.data.put_i32(value);
    }

    pub fn read_i32(&mut self) -> Result<i32, DecodeError> {
        let mut bytes = self.take(4)?;
        Ok(bytes.get_i32())
    }

    pub fn write_u64(&mut self, value: u64) {
        self.data.put_u64(value);
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        let mut bytes = self.take(8)?;
        Ok(bytes.get_u64())
    }

    pub fn write_i64(&mut self, value: i64) {
        self.data.put_i64(value);
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        let mut bytes = self.take(8)?;
        Ok(bytes.get_i64())
    }

    pub fn write_f32(&mut self, value: f32) {
        self.data.put_f32(value);
    }

    pub fn read_f32(&mut self) -> Result<f32, DecodeError> {
        let mut bytes = self.take(4)?;
        Ok(bytes.get_f32())
    }

    pub fn write_f64(&mut self, value: f64) {
        self.data.put_f64(value);
    }

    pub fn read_f64(&mut self) -> Result<f64, DecodeError> {
        let mut bytes = self.take(8)?;
        Ok(bytes.get_f64())
    }

    /// Writes a UUID as 16 big-endian bytes.
    pub fn write_uuid(&mut self, value: u128) {
        self.data.put_u128(value);
    }

    pub fn read_uuid(&mut self) -> Result<u128, DecodeError> {
        let mut bytes = self.take(16)?;
        Ok(bytes.get_u128())
    }

    /// Writes a 32-bit varint: 7 payload bits per byte, least-significant
    /// group first, continuation bit 0x80 on every byte except the last.
    pub fn write_varint(&mut self, value: i32) {
        let mut v = value as u32;
        loop {
            if v & !0x7F == 0 {
                self.data.put_u8(v as u8);
                return;
            }
            self.data.put_u8(((v & 0x7F) | 0x80) as u8);
            v >>= 7;
        }
    }

    /// Reads a 32-bit varint, failing once the 5-byte cap is exceeded.
    pub fn read_varint(&mut self) -> Result<i32, DecodeError> {
        let mut result: u32 = 0;
        for i in 0..VARINT_MAX_BYTES {
            let byte = self.read_u8()?;
            result |= u32::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result as i32);
            }
        }
        Err(DecodeError::VarIntTooLong {
            max: VARINT_MAX_BYTES,
        })
    }

    /// Writes a 64-bit varlong using the same grouped-7-bit encoding.
    pub fn write_varlong(&mut self, value: i64) {
        let mut v = value as u64;
        loop {
            if v & !0x7F == 0 {
                self.data.put_u8(v as u8);
                return;
            }
            self.data.put_u8(((v & 0x7F) | 0x80) as u8);
            v >>= 7;
        }
    }

    /// Reads a 64-bit varlong, failing once the 10-byte cap is exceeded.
    pub fn read_varlong(&mut self) -> Result<i64, DecodeError> {
        let mut result: u64 = 0;
        for i in 0..VARLONG_MAX_BYTES {
            let byte = self.read_u8()?;
            result |= u64::from(byte & 0x7F) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(result as i64);
            }
        }
        Err(DecodeError::VarIntTooLong {
            max: VARLONG_MAX_BYTES,
        })
    }

    /// Writes a UTF-8 string prefixed by its byte length as a varint.
    pub fn write_utf(&mut self, value: &str) -> Result<(), EncodeError> {
        if value.len() > MAX_STRING_BYTES {
            return Err(EncodeError::StringTooLong {
                len: value.len(),
                max: MAX_STRING_BYTES,
            });
        }
        self.write_varint(value.len() as i32);
        self.data.put_slice(value.as_bytes());
        Ok(())
    }

    /// Reads a varint-length-prefixed UTF-8 string.
    ///
    /// The declared length is validated before any allocation so a malicious
    /// prefix cannot trigger an oversized buffer.
    pub fn read_utf(&mut self) -> Result<String, DecodeError> {
        let declared = self.read_varint()?;
        if declared < 0 {
            return Err(DecodeError::NegativeLength(i64::from(declared)));
        }
        let len = declared as usize;
        if len > MAX_STRING_BYTES {
            return Err(DecodeError::LengthLimitExceeded {
                len,
                max: MAX_STRING_BYTES,
            });
        }
        let bytes = self.take(len)?;
        let text = std::str::from_utf8(bytes)?;
        Ok(text.to_owned())
    }

    /// Appends a raw span with no length prefix.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.data.put_slice(bytes);
    }

    /// Reads a raw span whose length the caller already knows.
    pub fn read_bytes(&mut self, n: usize) -> Result<Vec<u8>, DecodeError> {
        Ok(self.take(n)?.to_vec())
    }

    /// Writes a varint-length-prefixed byte span.
    pub fn write_bytearray(&mut self, bytes: &[u8]) -> Result<(), EncodeError> {
        if bytes.len() > i32::MAX as usize {
            return Err(EncodeError::SpanTooLong {
                len: bytes.len(),
                max: i32::MAX as usize,
            });
        }
        self.write_varint(bytes.len() as i32);
        self.data.put_slice(bytes);
        Ok(())
    }

    /// Reads a varint-length-prefixed byte span, length-guarded like
    /// [`Buffer::read_utf`].
    pub fn read_bytearray(&mut self) -> Result<Vec<u8>, DecodeError> {
        let declared = self.read_varint()?;
        if declared < 0 {
            return Err(DecodeError::NegativeLength(i64::from(declared)));
        }
        let len = declared as usize;
        if len > MAX_BYTES {
            return Err(DecodeError::LengthLimitExceeded {
                len,
                max: MAX_BYTES,
            });
        }
        self.read_bytes(len)
    }
}

impl From<&[u8]> for Buffer {
    fn from(bytes: &[u8]) -> Self {
        Self {
            data: BytesMut::from(bytes),
            cursor: 0,
        }
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self::from(bytes.as_slice())
    }
}

impl From<Bytes> for Buffer {
    fn from(bytes: Bytes) -> Self {
        Self::from(bytes.as_ref())
    }
}

impl Read for Buffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.cursor..self.cursor + n]);
        self.cursor += n;
        Ok(n)
    }
}

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_width_roundtrip() {
        let mut buf = Buffer::new();
        buf.write_u8(0xAB);
        buf.write_i16(-1234);
        buf.write_u32(0xDEAD_BEEF);
        buf.write_i64(i64::MIN);
        buf.write_f32(1.5);
        buf.write_f64(-2.25);
        buf.write_bool(true);
        buf.write_uuid(0x1122_3344_5566_7788_99AA_BBCC_DDEE_FF00);

        assert_eq!(buf.read_u8().unwrap(), 0xAB);
        assert_eq!(buf.read_i16().unwrap(), -1234);
        assert_eq!(buf.read_u32().unwrap(), 0xDEAD_BEEF);
        assert_eq!(buf.read_i64().unwrap(), i64::MIN);
        assert_eq!(buf.read_f32().unwrap(), 1.5);
        assert_eq!(buf.read_f64().unwrap(), -2.25);
        assert!(buf.read_bool().unwrap());
        assert_eq!(
            buf.read_uuid().unwrap(),
            0x1122_3344_5566_7788_99AA_BBCC_DDEE_FF00
        );
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn varint_roundtrip_wire_values() {
        for &v in &[0, 1, 127, 128, 255, 25565, 2_097_151, i32::MAX, -1] {
            let mut buf = Buffer::new();
            buf.write_varint(v);
            assert_eq!(buf.read_varint().unwrap(), v);
        }
    }

    #[test]
    fn varint_300_wire_form() {
        let mut buf = Buffer::new();
        buf.write_varint(300);
        assert_eq!(&buf.clone().into_bytes()[..], &[0xAC, 0x02]);
        assert_eq!(buf.read_varint().unwrap(), 300);
    }

    #[test]
    fn varint_negative_one_takes_five_bytes() {
        let mut buf = Buffer::new();
        buf.write_varint(-1);
        assert_eq!(
            &buf.clone().into_bytes()[..],
            &[0xFF, 0xFF, 0xFF, 0xFF, 0x0F]
        );
        assert_eq!(buf.read_varint().unwrap(), -1);
    }

    #[test]
    fn varint_rejects_six_continuation_bytes() {
        let mut buf = Buffer::from(&[0x80u8, 0x80, 0x80, 0x80, 0x80, 0x80][..]);
        assert!(matches!(
            buf.read_varint(),
            Err(DecodeError::VarIntTooLong { max: 5 })
        ));
    }

    #[test]
    fn varlong_roundtrip_and_cap() {
        for &v in &[0i64, 1, -1, i64::MAX, i64::MIN, 1 << 40] {
            let mut buf = Buffer::new();
            buf.write_varlong(v);
            assert_eq!(buf.read_varlong().unwrap(), v);
        }

        let mut buf = Buffer::from(&[0x80u8; 11][..]);
        assert!(matches!(
            buf.read_varlong(),
            Err(DecodeError::VarIntTooLong { max: 10 })
        ));
    }

    #[test]
    fn utf_roundtrip() {
        for s in ["", "hello", "zażółć gęślą jaźń", "状態"] {
            let mut buf = Buffer::new();
            buf.write_utf(s).unwrap();
            assert_eq!(buf.read_utf().unwrap(), s);
        }
    }

    #[test]
    fn utf_rejects_oversized_declared_length() {
        let mut buf = Buffer::new();
        buf.write_varint((MAX_STRING_BYTES + 1) as i32);
        assert!(matches!(
            buf.read_utf(),
            Err(DecodeError::LengthLimitExceeded { .. })
        ));
    }

    #[test]
    fn utf_rejects_invalid_utf8() {
        let mut buf = Buffer::new();
        buf.write_varint(2);
        buf.write_bytes(&[0xC0, 0x00]);
        assert!(matches!(buf.read_utf(), Err(DecodeError::InvalidUtf8(_))));
    }

    #[test]
    fn write_utf_rejects_oversized_string() {
        let long = "a".repeat(MAX_STRING_BYTES + 1);
        let mut buf = Buffer::new();
        assert!(matches!(
            buf.write_utf(&long),
            Err(EncodeError::StringTooLong { .. })
        ));
    }

    #[test]
    fn bytearray_roundtrip() {
        let payload = [7u8, 0, 255, 42];
        let mut buf = Buffer::new();
        buf.write_bytearray(&payload).unwrap();
        assert_eq!(buf.read_bytearray().unwrap(), payload);
    }

    #[test]
    fn reading_empty_buffer_is_exhaustion_not_default() {
        let mut buf = Buffer::new();
        assert!(matches!(buf.read_u8(), Err(DecodeError::UnexpectedEof)));
        assert!(matches!(buf.read_i64(), Err(DecodeError::UnexpectedEof)));
        assert!(matches!(buf.read_varint(), Err(DecodeError::UnexpectedEof)));
        assert!(matches!(buf.read_utf(), Err(DecodeError::UnexpectedEof)));
    }

    #[test]
    fn partial_read_does_not_advance_cursor() {
        let mut buf = Buffer::new();
        buf.write_u8(0x01);
        assert!(buf.read_u32().is_err());
        assert_eq!(buf.remaining(), 1);
        assert_eq!(buf.read_u8().unwrap(), 0x01);
    }

    #[test]
    fn io_read_exact_reports_eof() {
        use std::io::Read;

        let mut buf = Buffer::from(&[1u8, 2, 3][..]);
        let mut out = [0u8; 4];
        let err = buf.read_exact(&mut out).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    }
}
