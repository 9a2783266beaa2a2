//! Bit-level writer for encoding packed binary data.

use crate::cursor::BitCursor;
use crate::error::{BitError, BitResult};
use crate::primitive::Primitive;

/// Widest field accepted by [`BitWriter::write_bits`].
pub const MAX_BITS: u8 = 32;

/// An append-only writer mixing bit-level and byte-aligned fields.
///
/// Bit fields accumulate in a pending byte that is committed to the buffer as
/// soon as it holds eight bits. Byte-aligned writes go straight to the buffer
/// and do not flush pending bits: call [`flush_bits`](Self::flush_bits) first.
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// The committed bytes.
    bytes: Vec<u8>,
    cursor: BitCursor,
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BitWriter {
    /// Creates a new empty `BitWriter`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: Vec::new(),
            cursor: BitCursor::for_write(),
        }
    }

    /// Creates a new `BitWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
            cursor: BitCursor::for_write(),
        }
    }

    /// Number of committed bytes (pending bits excluded).
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty() && self.cursor.filled() == 0
    }

    /// Returns the number of bits written so far, pending bits included.
    #[must_use]
    pub fn bits_written(&self) -> usize {
        self.bytes.len() * 8 + self.cursor.filled() as usize
    }

    /// Number of bits waiting in the accumulator (`0..8`).
    #[must_use]
    pub const fn pending_bits(&self) -> u8 {
        self.cursor.filled()
    }

    /// Returns `true` if no bits are pending.
    #[must_use]
    pub const fn is_aligned(&self) -> bool {
        self.cursor.filled() == 0
    }

    /// The committed bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Writes a single bit.
    #[inline]
    pub fn write_bit(&mut self, value: bool) {
        if let Some(full) = self.cursor.push(value) {
            self.bytes.push(full);
        }
    }

    /// Writes the low `bits` bits of `value`, most significant first.
    ///
    /// Higher bits of `value` are dropped. With the `checks` feature enabled
    /// an oversized value panics instead.
    ///
    /// # Errors
    ///
    /// Returns [`BitError::InvalidBitCount`] if `bits > 32`.
    pub fn write_bits(&mut self, value: u32, bits: u8) -> BitResult<()> {
        if bits > MAX_BITS {
            return Err(BitError::InvalidBitCount {
                bits,
                max_bits: MAX_BITS,
            });
        }
        #[cfg(feature = "checks")]
        assert!(
            bits == MAX_BITS || value >> bits == 0,
            "value {value} does not fit in {bits} bits"
        );
        for i in (0..bits).rev() {
            self.write_bit((value >> i) & 1 == 1);
        }
        Ok(())
    }

    /// Pads the pending byte with zero bits and commits it.
    ///
    /// Does nothing if no bits are pending.
    pub fn flush_bits(&mut self) {
        if let Some(padded) = self.cursor.flush() {
            self.bytes.push(padded);
        }
    }

    /// Writes a byte-aligned little-endian primitive.
    #[inline]
    pub fn write<T: Primitive>(&mut self, value: T) {
        self.check_aligned();
        value.write_le(&mut self.bytes);
    }

    /// Writes a `u8`.
    pub fn write_u8(&mut self, value: u8) {
        self.write(value);
    }

    /// Writes a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) {
        self.write(value);
    }

    /// Writes a little-endian `u32`.
    pub fn write_u32(&mut self, value: u32) {
        self.write(value);
    }

    /// Writes a little-endian `u64`.
    pub fn write_u64(&mut self, value: u64) {
        self.write(value);
    }

    /// Writes an `i8`.
    pub fn write_i8(&mut self, value: i8) {
        self.write(value);
    }

    /// Writes a little-endian `i16`.
    pub fn write_i16(&mut self, value: i16) {
        self.write(value);
    }

    /// Writes a little-endian `i32`.
    pub fn write_i32(&mut self, value: i32) {
        self.write(value);
    }

    /// Writes a little-endian `i64`.
    pub fn write_i64(&mut self, value: i64) {
        self.write(value);
    }

    /// Writes a little-endian `f32`.
    pub fn write_f32(&mut self, value: f32) {
        self.write(value);
    }

    /// Writes a little-endian `f64`.
    pub fn write_f64(&mut self, value: f64) {
        self.write(value);
    }

    /// Appends raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.check_aligned();
        self.bytes.extend_from_slice(bytes);
    }

    /// Drops all written data, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
        self.cursor = BitCursor::for_write();
    }

    #[inline]
    fn check_aligned(&self) {
        #[cfg(feature = "checks")]
        assert!(
            self.is_aligned(),
            "byte-aligned write with {} bits pending",
            self.pending_bits()
        );
    }

    /// Finishes writing and returns the byte buffer.
    ///
    /// A partially filled last byte is zero-padded.
    #[must_use]
    pub fn finish(mut self) -> Vec<u8> {
        self.flush_bits();
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        self.flush_bits();
        buf.append(&mut self.bytes);
    }
}
