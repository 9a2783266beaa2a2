//! Bit-level reader with bounded operations.

use crate::cursor::BitCursor;
use crate::error::{BitError, BitResult};
use crate::primitive::Primitive;
use crate::writer::MAX_BITS;

/// A reader over a borrowed buffer mixing bit-level and byte-aligned fields.
///
/// Bit reads pull a byte from the byte cursor on demand and consume it bit by
/// bit. Byte-aligned reads always come from the byte cursor, so a partially
/// consumed byte is never re-read by them. After byte-aligned reads the next
/// bit read must be preceded by [`reset_bit_pos`](Self::reset_bit_pos) if bit
/// reads happened before; otherwise it continues the stale byte.
///
/// All read operations are bounds-checked and return errors on failure.
/// A failed read leaves the reader unchanged.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Byte cursor: index of the next byte not yet handed out.
    pos: usize,
    cursor: BitCursor,
}

impl<'a> BitReader<'a> {
    /// Creates a new `BitReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            cursor: BitCursor::for_read(),
        }
    }

    /// Byte cursor position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    /// Bytes after the byte cursor.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns the unread bytes after the byte cursor without consuming them.
    #[must_use]
    pub fn remaining_bytes(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }

    /// Bits still readable by bit-level reads.
    #[must_use]
    pub const fn bits_remaining(&self) -> usize {
        self.cursor.unread() as usize + self.remaining().saturating_mul(8)
    }

    /// Returns `true` if there is nothing left to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bits_remaining() == 0
    }

    /// Returns `true` if no partially consumed byte is pending.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.cursor.unread() == 0
    }

    /// Reads a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> BitResult<bool> {
        if self.cursor.unread() == 0 {
            let Some(&byte) = self.data.get(self.pos) else {
                return Err(BitError::UnexpectedEof {
                    requested: 1,
                    available: 0,
                });
            };
            self.pos += 1;
            self.cursor.load(byte);
        }
        Ok(self.cursor.pop())
    }

    /// Reads a single bit; alias used for presence flags.
    #[inline]
    pub fn has_bit(&mut self) -> BitResult<bool> {
        self.read_bit()
    }

    /// Reads a `bits`-wide unsigned field, most significant bit first.
    pub fn read_bits(&mut self, bits: u8) -> BitResult<u32> {
        if bits > MAX_BITS {
            return Err(BitError::InvalidBitCount {
                bits,
                max_bits: MAX_BITS,
            });
        }
        let available = self.bits_remaining();
        if bits as usize > available {
            return Err(BitError::UnexpectedEof {
                requested: bits as usize,
                available,
            });
        }

        let mut value = 0u32;
        for _ in 0..bits {
            value = (value << 1) | u32::from(self.read_bit()?);
        }
        Ok(value)
    }

    /// Discards the rest of a partially consumed byte.
    ///
    /// The byte cursor has already moved past that byte, so this only resets
    /// the bit accumulator. Calling it when aligned does nothing.
    pub fn reset_bit_pos(&mut self) {
        self.cursor.discard();
    }

    /// Reads a byte-aligned little-endian primitive.
    #[inline]
    pub fn read<T: Primitive>(&mut self) -> BitResult<T> {
        let bytes = self.read_bytes(T::SIZE)?;
        Ok(T::read_le(bytes))
    }

    /// Reads a `u8`.
    pub fn read_u8(&mut self) -> BitResult<u8> {
        self.read()
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> BitResult<u16> {
        self.read()
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> BitResult<u32> {
        self.read()
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> BitResult<u64> {
        self.read()
    }

    /// Reads an `i8`.
    pub fn read_i8(&mut self) -> BitResult<i8> {
        self.read()
    }

    /// Reads a little-endian `i16`.
    pub fn read_i16(&mut self) -> BitResult<i16> {
        self.read()
    }

    /// Reads a little-endian `i32`.
    pub fn read_i32(&mut self) -> BitResult<i32> {
        self.read()
    }

    /// Reads a little-endian `i64`.
    pub fn read_i64(&mut self) -> BitResult<i64> {
        self.read()
    }

    /// Reads a little-endian `f32`.
    pub fn read_f32(&mut self) -> BitResult<f32> {
        self.read()
    }

    /// Reads a little-endian `f64`.
    pub fn read_f64(&mut self) -> BitResult<f64> {
        self.read()
    }

    /// Borrows the next `len` bytes.
    pub fn read_bytes(&mut self, len: usize) -> BitResult<&'a [u8]> {
        let available = self.remaining();
        if len > available {
            return Err(BitError::Truncated {
                requested: len,
                available,
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Skips `len` bytes.
    pub fn skip(&mut self, len: usize) -> BitResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Splits off a reader over the next `len` bytes and advances past them.
    pub fn sub_reader(&mut self, len: usize) -> BitResult<BitReader<'a>> {
        self.read_bytes(len).map(BitReader::new)
    }
}
