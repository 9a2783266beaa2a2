//! 64-bit object identifiers and their compressed wire forms.
//!
//! Two encodings are supported:
//!
//! - **Packed**: a mask byte with bit `i` set when byte `i` (little-endian
//!   order) is non-zero, followed by the non-zero bytes in ascending index
//!   order. Costs 1 to 9 bytes.
//! - **Scattered**: one presence bit per byte inside a bit-packed region, in a
//!   call-site specific order, and later the present bytes in a second
//!   call-site specific order, each XOR-ed with `0x01`.

use std::fmt;

use bitstream::{BitReader, BitWriter};

use crate::error::WireResult;

/// Number of bits reserved for the counter part of an identifier.
const COUNTER_BITS: u32 = 48;
const COUNTER_MASK: u64 = (1 << COUNTER_BITS) - 1;

/// An opaque 64-bit object identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Guid(u64);

impl Guid {
    /// The all-zero identifier.
    pub const EMPTY: Self = Self(0);

    /// Wraps a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Builds an identifier from a type tag and an instance counter.
    ///
    /// Counter bits above bit 47 are dropped.
    #[must_use]
    pub const fn from_parts(high_type: u16, counter: u64) -> Self {
        Self(((high_type as u64) << COUNTER_BITS) | (counter & COUNTER_MASK))
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Returns the type tag (top 16 bits).
    #[must_use]
    pub const fn high_type(self) -> u16 {
        (self.0 >> COUNTER_BITS) as u16
    }

    /// Returns the instance counter (low 48 bits).
    #[must_use]
    pub const fn counter(self) -> u64 {
        self.0 & COUNTER_MASK
    }

    /// Returns `true` for the all-zero identifier.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns the identifier bytes in little-endian order.
    #[must_use]
    pub const fn to_le_bytes(self) -> [u8; 8] {
        self.0.to_le_bytes()
    }

    /// Builds an identifier from little-endian bytes.
    #[must_use]
    pub const fn from_le_bytes(bytes: [u8; 8]) -> Self {
        Self(u64::from_le_bytes(bytes))
    }

    /// Presence mask: bit `i` set when byte `i` is non-zero.
    #[must_use]
    pub fn mask(self) -> u8 {
        self.to_le_bytes()
            .iter()
            .enumerate()
            .filter(|(_, byte)| **byte != 0)
            .fold(0u8, |mask, (i, _)| mask | (1u8 << i))
    }

    /// Appends the packed form to a byte-aligned writer.
    pub fn write_packed(self, writer: &mut BitWriter) {
        writer.write_u8(self.mask());
        for byte in self.to_le_bytes().into_iter().filter(|b| *b != 0) {
            writer.write_u8(byte);
        }
    }

    /// Reads a packed identifier from a byte-aligned reader.
    pub fn read_packed(reader: &mut BitReader<'_>) -> WireResult<Self> {
        let mask = reader.read_u8()?;
        // Check the whole run up front so a short read consumes nothing.
        let present = mask.count_ones() as usize;
        let values = reader.read_bytes(present)?;
        let mut values = values.iter();
        let mut bytes = [0u8; 8];
        for (i, slot) in bytes.iter_mut().enumerate() {
            if mask & (1u8 << i) != 0 {
                if let Some(&value) = values.next() {
                    *slot = value;
                }
            }
        }
        Ok(Self::from_le_bytes(bytes))
    }

    /// Encoded size of the packed form.
    #[must_use]
    pub fn packed_len(self) -> usize {
        1 + self.mask().count_ones() as usize
    }
}

impl From<u64> for Guid {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl From<Guid> for u64 {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016X}", self.0)
    }
}

/// Writes `guid` in packed form.
pub fn write_packed_guid(writer: &mut BitWriter, guid: Guid) {
    guid.write_packed(writer);
}

/// Reads a packed identifier.
pub fn read_packed_guid(reader: &mut BitReader<'_>) -> WireResult<Guid> {
    Guid::read_packed(reader)
}

/// Encoded size of `guid` in packed form.
#[must_use]
pub fn packed_guid_len(guid: Guid) -> usize {
    guid.packed_len()
}

/// Encoder for the scattered identifier form.
///
/// Byte indices are little-endian positions `0..8`; orders are fixed per
/// message field and must match between writer and reader.
///
/// # Panics
///
/// Panics if an index in `order` is 8 or greater.
pub mod scattered {
    use super::{BitReader, BitWriter, Guid, WireResult};

    /// Writes one presence bit per byte named in `order`.
    pub fn write_mask(writer: &mut BitWriter, guid: Guid, order: &[u8]) {
        let bytes = guid.to_le_bytes();
        for &index in order {
            writer.write_bit(bytes[usize::from(index)] != 0);
        }
    }

    /// Writes the present bytes named in `order`, XOR-ed with `0x01`.
    pub fn write_bytes(writer: &mut BitWriter, guid: Guid, order: &[u8]) {
        let bytes = guid.to_le_bytes();
        for &index in order {
            let byte = bytes[usize::from(index)];
            if byte != 0 {
                writer.write_u8(byte ^ 1);
            }
        }
    }

    /// Accumulates a scattered identifier while its bits and bytes are read.
    ///
    /// Mask bits and bytes may be interleaved with other fields, so the
    /// builder reads one piece at a time.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct GuidReader {
        mask: u8,
        bytes: [u8; 8],
    }

    impl GuidReader {
        /// Creates an empty builder.
        #[must_use]
        pub const fn new() -> Self {
            Self {
                mask: 0,
                bytes: [0; 8],
            }
        }

        /// Reads presence bits for the bytes named in `order`.
        pub fn read_mask(&mut self, reader: &mut BitReader<'_>, order: &[u8]) -> WireResult<()> {
            for &index in order {
                if reader.has_bit()? {
                    self.mask |= 1u8 << index;
                }
            }
            Ok(())
        }

        /// Reads the bytes named in `order` whose presence bit is set.
        pub fn read_bytes(&mut self, reader: &mut BitReader<'_>, order: &[u8]) -> WireResult<()> {
            for &index in order {
                if self.mask & (1u8 << index) != 0 {
                    self.bytes[usize::from(index)] = reader.read_u8()? ^ 1;
                }
            }
            Ok(())
        }

        /// Presence mask collected so far.
        #[must_use]
        pub const fn mask(&self) -> u8 {
            self.mask
        }

        /// Returns the identifier.
        #[must_use]
        pub const fn finish(self) -> Guid {
            Guid::from_le_bytes(self.bytes)
        }
    }
}
