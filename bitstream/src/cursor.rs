//! Sub-byte accumulator shared by the writer and the reader.
//!
//! Bits are packed most-significant first: the first bit of a byte occupies
//! bit 7, the eighth occupies bit 0.

/// Bit position value meaning "no byte loaded" on the read side.
const EXHAUSTED: u8 = 8;

/// A partially filled (write) or partially consumed (read) byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BitCursor {
    byte: u8,
    /// Bits filled (write side, `0..8`) or bits consumed (read side, `0..=8`).
    pos: u8,
}

impl BitCursor {
    /// Cursor for a writer: empty accumulator.
    pub(crate) const fn for_write() -> Self {
        Self { byte: 0, pos: 0 }
    }

    /// Cursor for a reader: no byte loaded yet.
    pub(crate) const fn for_read() -> Self {
        Self {
            byte: 0,
            pos: EXHAUSTED,
        }
    }

    /// Number of bits pending in the write accumulator.
    pub(crate) const fn filled(self) -> u8 {
        self.pos
    }

    /// Appends one bit. Returns the completed byte once eight bits are in.
    #[inline]
    pub(crate) fn push(&mut self, bit: bool) -> Option<u8> {
        debug_assert!(self.pos < 8);
        if bit {
            self.byte |= 1 << (7 - self.pos);
        }
        self.pos += 1;
        if self.pos == 8 {
            let full = self.byte;
            *self = Self::for_write();
            Some(full)
        } else {
            None
        }
    }

    /// Zero-pads and returns the pending byte, if any bits are pending.
    pub(crate) fn flush(&mut self) -> Option<u8> {
        if self.pos == 0 {
            return None;
        }
        let padded = self.byte;
        *self = Self::for_write();
        Some(padded)
    }

    /// Bits still unread in the loaded byte.
    pub(crate) const fn unread(self) -> u8 {
        EXHAUSTED - self.pos
    }

    /// Loads a fresh byte for bit-level reads.
    pub(crate) fn load(&mut self, byte: u8) {
        self.byte = byte;
        self.pos = 0;
    }

    /// Takes the next bit from the loaded byte.
    #[inline]
    pub(crate) fn pop(&mut self) -> bool {
        debug_assert!(self.pos < EXHAUSTED);
        let bit = (self.byte >> (7 - self.pos)) & 1 == 1;
        self.pos += 1;
        bit
    }

    /// Discards whatever remains of the loaded byte.
    pub(crate) fn discard(&mut self) {
        *self = Self::for_read();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_is_msb_first() {
        let mut cursor = BitCursor::for_write();
        assert_eq!(cursor.push(true), None);
        assert_eq!(cursor.filled(), 1);
        assert_eq!(cursor.flush(), Some(0b1000_0000));
        assert_eq!(cursor.filled(), 0);
    }

    #[test]
    fn eight_pushes_commit() {
        let mut cursor = BitCursor::for_write();
        let mut out = None;
        for bit in [true, true, false, false, true, false, true, true] {
            out = cursor.push(bit);
        }
        assert_eq!(out, Some(0b1100_1011));
        assert_eq!(cursor.flush(), None);
    }

    #[test]
    fn pop_reads_back_in_order() {
        let mut cursor = BitCursor::for_read();
        assert_eq!(cursor.unread(), 0);
        cursor.load(0b1010_0000);
        assert!(cursor.pop());
        assert!(!cursor.pop());
        assert!(cursor.pop());
        assert_eq!(cursor.unread(), 5);
        cursor.discard();
        assert_eq!(cursor.unread(), 0);
    }
}
