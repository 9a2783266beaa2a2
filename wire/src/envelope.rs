//! Transport framing: size and opcode header ahead of each payload.
//!
//! Frames from the server carry a 6-byte header, `u32` size (payload length
//! plus the 2 opcode bytes) then a `u16` opcode. Frames from the client carry
//! an 8-byte header, `u32` payload length then a `u32` opcode. All fields are
//! little-endian.

use bitstream::{BitReader, BitWriter};
use tracing::trace;

use crate::error::{DecodeError, EncodeError, EncodeResult, LimitKind, WireResult};
use crate::limits::Limits;
use crate::message::OutboundFrame;
use crate::opcode::Opcode;

/// Header size of a server-to-client frame.
pub const SERVER_HEADER_SIZE: usize = 4 + 2;

/// Header size of a client-to-server frame.
pub const CLIENT_HEADER_SIZE: usize = 4 + 4;

/// Which side produced a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Direction {
    ServerToClient,
    ClientToServer,
}

impl Direction {
    /// Header size for frames in this direction.
    #[must_use]
    pub const fn header_size(self) -> usize {
        match self {
            Self::ServerToClient => SERVER_HEADER_SIZE,
            Self::ClientToServer => CLIENT_HEADER_SIZE,
        }
    }

    const fn opcode_bits(self) -> u8 {
        match self {
            Self::ServerToClient => 16,
            Self::ClientToServer => 32,
        }
    }

    /// Bytes of the opcode field counted by the size field.
    const fn counted_overhead(self) -> u32 {
        match self {
            Self::ServerToClient => 2,
            Self::ClientToServer => 0,
        }
    }
}

/// A received frame with its header stripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InboundFrame<'a> {
    pub opcode: Opcode,
    pub payload: &'a [u8],
}

impl<'a> InboundFrame<'a> {
    /// Creates a frame from an opcode and a payload.
    #[must_use]
    pub const fn new(opcode: Opcode, payload: &'a [u8]) -> Self {
        Self { opcode, payload }
    }
}

/// Appends `frame` with its header to `out`.
///
/// # Errors
///
/// Returns [`EncodeError::OpcodeOutOfRange`] if the opcode does not fit the
/// header field, and [`EncodeError::PayloadTooLarge`] if the payload length
/// does not fit the size field.
pub fn encode_frame(
    frame: &OutboundFrame,
    direction: Direction,
    out: &mut Vec<u8>,
) -> EncodeResult<()> {
    let opcode_bits = direction.opcode_bits();
    if opcode_bits < 32 && frame.opcode.raw() >> opcode_bits != 0 {
        return Err(EncodeError::OpcodeOutOfRange {
            opcode: frame.opcode,
            bits: opcode_bits,
        });
    }
    let overhead = direction.counted_overhead();
    let limit = (u32::MAX - overhead) as usize;
    let len = frame.payload.len();
    let size = u32::try_from(len)
        .ok()
        .and_then(|len| len.checked_add(overhead))
        .ok_or(EncodeError::PayloadTooLarge { len, limit })?;

    let mut writer = BitWriter::with_capacity(direction.header_size() + len);
    writer.write_u32(size);
    match direction {
        Direction::ServerToClient => writer.write_u16(frame.opcode.raw() as u16),
        Direction::ClientToServer => writer.write_u32(frame.opcode.raw()),
    }
    writer.write_bytes(&frame.payload);
    writer.finish_into(out);
    trace!(opcode = %frame.opcode, len, ?direction, "encoded frame");
    Ok(())
}

/// Decodes the frame at the start of `buf`.
///
/// Returns the frame and the number of bytes it occupies.
pub fn decode_frame<'a>(
    buf: &'a [u8],
    direction: Direction,
    limits: &Limits,
) -> WireResult<(InboundFrame<'a>, usize)> {
    let header_size = direction.header_size();
    if buf.len() < header_size {
        return Err(DecodeError::FrameTooSmall {
            actual: buf.len(),
            required: header_size,
        });
    }

    let mut reader = BitReader::new(buf);
    let size = reader.read_u32()?;
    let opcode = match direction {
        Direction::ServerToClient => u32::from(reader.read_u16()?),
        Direction::ClientToServer => reader.read_u32()?,
    };
    let payload_len = size
        .checked_sub(direction.counted_overhead())
        .and_then(|len| usize::try_from(len).ok())
        .ok_or(DecodeError::InvalidFrameSize { size })?;

    if payload_len > limits.max_payload_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::PayloadBytes,
            limit: limits.max_payload_bytes,
            actual: payload_len,
        });
    }
    if reader.remaining() < payload_len {
        return Err(DecodeError::FrameTooSmall {
            actual: buf.len(),
            required: header_size + payload_len,
        });
    }

    let payload = reader.read_bytes(payload_len)?;
    Ok((
        InboundFrame::new(Opcode::new(opcode), payload),
        header_size + payload_len,
    ))
}

/// Iterator over back-to-back frames in a buffer.
///
/// Stops after the first error.
#[derive(Debug, Clone)]
pub struct FrameIter<'a> {
    buf: &'a [u8],
    offset: usize,
    direction: Direction,
    limits: &'a Limits,
    done: bool,
}

impl<'a> FrameIter<'a> {
    #[must_use]
    pub const fn new(buf: &'a [u8], direction: Direction, limits: &'a Limits) -> Self {
        Self {
            buf,
            offset: 0,
            direction,
            limits,
            done: false,
        }
    }

    /// Offset of the next frame within the buffer.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }
}

impl<'a> Iterator for FrameIter<'a> {
    type Item = WireResult<InboundFrame<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.buf.len() {
            return None;
        }
        match decode_frame(&self.buf[self.offset..], self.direction, self.limits) {
            Ok((frame, consumed)) => {
                self.offset += consumed;
                Some(Ok(frame))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
