//! Length-prefixed and NUL-terminated string fields.
//!
//! A sized string splits into two parts: its byte length, written as a bit
//! field of a call-site specific width inside a bit-packed region, and its raw
//! UTF-8 bytes, written byte-aligned after that region is flushed. No
//! terminator follows. A C-string is always byte-aligned and ends with `0x00`.

use bitstream::{BitReader, BitWriter};

use crate::error::{DecodeError, EncodeError, EncodeResult, LimitKind, WireResult};
use crate::limits::Limits;

/// Writes the byte length of `value` as a `bits`-wide field.
///
/// # Errors
///
/// Returns [`EncodeError::StringTooLong`] if the length needs more than
/// `bits` bits. Unlike other bit fields, a string length is never truncated:
/// the bytes that follow would desynchronize the stream.
pub fn write_sized_string_len(writer: &mut BitWriter, value: &str, bits: u8) -> EncodeResult<()> {
    let len = value.len();
    let too_long = EncodeError::StringTooLong { len, bits };
    let raw = u32::try_from(len).map_err(|_| too_long.clone())?;
    if bits < 32 && raw >> bits != 0 {
        return Err(too_long);
    }
    writer.write_bits(raw, bits)?;
    Ok(())
}

/// Writes the raw bytes of a sized string, without terminator.
pub fn write_string_bytes(writer: &mut BitWriter, value: &str) {
    writer.write_bytes(value.as_bytes());
}

/// Writes a sized string on its own: length, flush, bytes.
pub fn write_sized_string(writer: &mut BitWriter, value: &str, bits: u8) -> EncodeResult<()> {
    write_sized_string_len(writer, value, bits)?;
    writer.flush_bits();
    write_string_bytes(writer, value);
    Ok(())
}

/// Reads a `bits`-wide string length field.
pub fn read_sized_string_len(reader: &mut BitReader<'_>, bits: u8) -> WireResult<usize> {
    Ok(reader.read_bits(bits)? as usize)
}

/// Borrows `len` bytes of string data as `&str`.
pub fn read_str<'a>(reader: &mut BitReader<'a>, len: usize, limits: &Limits) -> WireResult<&'a str> {
    if len > limits.max_string_len {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::StringLength,
            limit: limits.max_string_len,
            actual: len,
        });
    }
    let bytes = reader.read_bytes(len)?;
    std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { len })
}

/// Reads `len` bytes of string data.
pub fn read_string(reader: &mut BitReader<'_>, len: usize, limits: &Limits) -> WireResult<String> {
    read_str(reader, len, limits).map(str::to_owned)
}

/// Reads a sized string on its own: length, reset, bytes.
pub fn read_sized_string(
    reader: &mut BitReader<'_>,
    bits: u8,
    limits: &Limits,
) -> WireResult<String> {
    let len = read_sized_string_len(reader, bits)?;
    reader.reset_bit_pos();
    read_string(reader, len, limits)
}

/// Writes a NUL-terminated string.
///
/// # Errors
///
/// Returns [`EncodeError::InteriorNul`] if `value` contains a NUL byte.
pub fn write_cstring(writer: &mut BitWriter, value: &str) -> EncodeResult<()> {
    if let Some(position) = value.bytes().position(|b| b == 0) {
        return Err(EncodeError::InteriorNul { position });
    }
    writer.write_bytes(value.as_bytes());
    writer.write_u8(0);
    Ok(())
}

/// Reads a NUL-terminated string, consuming the terminator.
pub fn read_cstring(reader: &mut BitReader<'_>, limits: &Limits) -> WireResult<String> {
    let rest = reader.remaining_bytes();
    let Some(len) = rest.iter().position(|b| *b == 0) else {
        return Err(DecodeError::UnterminatedString { scanned: rest.len() });
    };
    let value = read_str(reader, len, limits)?.to_owned();
    reader.skip(1)?;
    Ok(value)
}
