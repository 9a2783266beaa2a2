//! Bit cursor and bit-packed reader/writer for the realmwire protocol.
//!
//! This crate provides [`BitWriter`] and [`BitReader`]: a shared byte stream
//! carrying sub-byte bit fields next to byte-aligned little-endian primitives.
//!
//! # Design Principles
//!
//! - **No unsafe code** - Safety is paramount.
//! - **Bounded reads** - All reads are bounds-checked; a short buffer is an error, never a panic.
//! - **No domain knowledge** - This crate knows nothing about messages, opcodes or identifiers.
//! - **Caller-driven alignment** - Mixing bit and byte fields requires an explicit
//!   [`BitWriter::flush_bits`] / [`BitReader::reset_bit_pos`]; nothing is flushed implicitly.
//!
//! Bits are packed most-significant first within each byte.
//!
//! # Example
//!
//! ```
//! use bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bit(true);
//! writer.write_bits(42, 7).unwrap();
//! writer.flush_bits();
//! writer.write_u32(0xDEAD_BEEF);
//!
//! let bytes = writer.finish();
//!
//! let mut reader = BitReader::new(&bytes);
//! assert!(reader.has_bit().unwrap());
//! assert_eq!(reader.read_bits(7).unwrap(), 42);
//! reader.reset_bit_pos();
//! assert_eq!(reader.read_u32().unwrap(), 0xDEAD_BEEF);
//! ```

mod cursor;
mod error;
mod primitive;
mod reader;
mod writer;

pub use error::{BitError, BitResult};
pub use primitive::Primitive;
pub use reader::BitReader;
pub use writer::{BitWriter, MAX_BITS};
