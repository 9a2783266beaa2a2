//! Error types for wire format operations.

use bitstream::BitError;
use thiserror::Error;

use crate::opcode::Opcode;

/// Result type for decode operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Result type for encode operations.
pub type EncodeResult<T> = Result<T, EncodeError>;

/// Errors that abort decoding of a single message or frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The payload ended before a field was complete.
    #[error("truncated input: {0}")]
    Truncated(#[from] BitError),

    /// A C-string ran to the end of the buffer without a terminator.
    #[error("unterminated string after {scanned} bytes")]
    UnterminatedString { scanned: usize },

    /// String bytes are not valid UTF-8.
    #[error("string of {len} bytes is not valid UTF-8")]
    InvalidUtf8 { len: usize },

    /// A decoded field holds a value outside its domain.
    #[error("invalid value {value} for field `{field}`")]
    InvalidValue { field: &'static str, value: u64 },

    /// Frame buffer is too small to contain the frame header.
    #[error("frame too small: {actual} bytes, need at least {required}")]
    FrameTooSmall { actual: usize, required: usize },

    /// Size field of a frame header is inconsistent.
    #[error("invalid frame size field: {size}")]
    InvalidFrameSize { size: u32 },

    /// Bytes were left over after the message was read.
    #[error("{remaining} trailing bytes after {opcode}")]
    TrailingBytes { opcode: Opcode, remaining: usize },

    /// Limits exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LimitKind {
    #[error("payload bytes")]
    PayloadBytes,
    #[error("string length")]
    StringLength,
}

/// Errors that can occur during encoding.
///
/// These indicate a caller bug: the message cannot be represented on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// Bit-level write rejected its arguments.
    #[error("bitstream error: {0}")]
    Bits(#[from] BitError),

    /// String length does not fit its length field.
    #[error("string of {len} bytes does not fit a {bits}-bit length field")]
    StringTooLong { len: usize, bits: u8 },

    /// C-string contains a NUL byte that would end it early.
    #[error("string contains NUL at byte {position}")]
    InteriorNul { position: usize },

    /// Opcode does not fit the frame header's opcode field.
    #[error("opcode {opcode} does not fit the {bits}-bit header field")]
    OpcodeOutOfRange { opcode: Opcode, bits: u8 },

    /// Payload is larger than the frame header can describe.
    #[error("payload of {len} bytes exceeds limit {limit}")]
    PayloadTooLarge { len: usize, limit: usize },

    /// A value does not fit the field it is encoded into.
    #[error("value {value} does not fit field `{field}`")]
    ValueOutOfRange { field: &'static str, value: u64 },
}
