//! The compact binary wire format.
//!
//! # Format
//!
//! | Value kind | Encoding                                    |
//! |------------|---------------------------------------------|
//! | bool       | one byte, 0 or 1                            |
//! | i32 / i64  | fixed-width big-endian                      |
//! | f32 / f64  | IEEE-754 bits, big-endian                   |
//! | string     | i32 byte length, then UTF-8 bytes           |
//! | list / map | i32 element count, then elements in order   |
//!
//! No field names or type tags are written — a stream is only decodable by
//! the schema set that produced it, with fields in declared order.

use crate::error::{DecodeError, DecodeErrorKind, DecodeResult};

// ── WireWriter ────────────────────────────────────────────────────────────────

/// Append-only buffer for encoding values into the wire format.
#[derive(Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the writer, returning the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    #[inline]
    pub fn put_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    #[inline]
    pub fn put_bool(&mut self, v: bool) {
        self.buf.push(v as u8);
    }

    #[inline]
    pub fn put_i32(&mut self, v: i32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn put_i64(&mut self, v: i64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn put_f32(&mut self, v: f32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    #[inline]
    pub fn put_f64(&mut self, v: f64) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    /// Element count prefix for lists and maps.
    ///
    /// # Panics
    /// Panics in debug mode if `n` exceeds `i32::MAX` elements.
    #[inline]
    pub fn put_len(&mut self, n: usize) {
        debug_assert!(n <= i32::MAX as usize, "collection too large for wire format");
        self.put_i32(n as i32);
    }

    /// i32 length-prefixed UTF-8 string.
    pub fn put_str(&mut self, s: &str) {
        self.put_len(s.len());
        self.buf.extend_from_slice(s.as_bytes());
    }
}

// ── WireReader ────────────────────────────────────────────────────────────────

/// Cursor over a wire-format byte slice.
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> DecodeResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(DecodeError::receiving(DecodeErrorKind::Eof));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    #[inline]
    pub fn get_u8(&mut self) -> DecodeResult<u8> {
        Ok(self.take(1)?[0])
    }

    #[inline]
    pub fn get_bool(&mut self) -> DecodeResult<bool> {
        Ok(self.get_u8()? != 0)
    }

    #[inline]
    pub fn get_i32(&mut self) -> DecodeResult<i32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().map_err(|_| {
            DecodeError::receiving(DecodeErrorKind::Eof)
        })?;
        Ok(i32::from_be_bytes(bytes))
    }

    #[inline]
    pub fn get_i64(&mut self) -> DecodeResult<i64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().map_err(|_| {
            DecodeError::receiving(DecodeErrorKind::Eof)
        })?;
        Ok(i64::from_be_bytes(bytes))
    }

    #[inline]
    pub fn get_f32(&mut self) -> DecodeResult<f32> {
        let bytes: [u8; 4] = self.take(4)?.try_into().map_err(|_| {
            DecodeError::receiving(DecodeErrorKind::Eof)
        })?;
        Ok(f32::from_be_bytes(bytes))
    }

    #[inline]
    pub fn get_f64(&mut self) -> DecodeResult<f64> {
        let bytes: [u8; 8] = self.take(8)?.try_into().map_err(|_| {
            DecodeError::receiving(DecodeErrorKind::Eof)
        })?;
        Ok(f64::from_be_bytes(bytes))
    }

    /// Element count prefix; rejects negative counts.
    pub fn get_len(&mut self) -> DecodeResult<usize> {
        let n = self.get_i32()?;
        usize::try_from(n).map_err(|_| {
            DecodeError::receiving(DecodeErrorKind::Message(format!(
                "negative length prefix {n}"
            )))
        })
    }

    /// i32 length-prefixed UTF-8 string.
    pub fn get_str(&mut self) -> DecodeResult<String> {
        let len = self.get_len()?;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| DecodeError::receiving(DecodeErrorKind::Utf8))
    }
}
