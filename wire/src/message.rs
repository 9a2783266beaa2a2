//! Message roles and the payload encode/decode contract.
//!
//! A message schema is implicit in the order of its `write`/`read` calls;
//! nothing on the wire names or tags fields. Outbound and inbound roles are
//! separate traits and most message types implement exactly one of them.

use bitstream::{BitReader, BitWriter};
use tracing::trace;

use crate::error::{DecodeError, EncodeResult, LimitKind, WireResult};
use crate::limits::Limits;
use crate::opcode::{ConnectionType, Opcode};

/// A message the server sends.
pub trait Encodable {
    /// Opcode prepended by the transport.
    const OPCODE: Opcode;

    /// Connection the message is routed to.
    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Default
    }

    /// Expected payload size, used to pre-size the buffer.
    fn size_hint(&self) -> usize {
        0
    }

    /// Appends the payload to `writer`.
    ///
    /// Must not mutate the message: encoding twice yields identical bytes.
    fn write(&self, writer: &mut BitWriter) -> EncodeResult<()>;
}

/// A message the server receives.
pub trait Decodable: Sized {
    /// Opcode the transport stripped before the payload.
    const OPCODE: Opcode;

    /// Reads the payload from `reader`.
    ///
    /// `limits` bounds variable-length fields such as strings.
    fn read(reader: &mut BitReader<'_>, limits: &Limits) -> WireResult<Self>;
}

/// An encoded outbound message ready for framing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundFrame {
    pub opcode: Opcode,
    pub connection: ConnectionType,
    pub payload: Vec<u8>,
}

/// Encodes a message into a fresh, byte-aligned payload.
pub fn encode_message<M: Encodable>(message: &M) -> EncodeResult<OutboundFrame> {
    let mut writer = BitWriter::with_capacity(message.size_hint());
    message.write(&mut writer)?;
    let payload = writer.finish();
    trace!(opcode = %M::OPCODE, len = payload.len(), "encoded message");
    Ok(OutboundFrame {
        opcode: M::OPCODE,
        connection: message.connection_type(),
        payload,
    })
}

/// Decodes a message from a payload whose opcode has already been stripped.
///
/// Trailing bytes are tolerated unless [`Limits::reject_trailing_bytes`] is set.
pub fn decode_message<M: Decodable>(payload: &[u8], limits: &Limits) -> WireResult<M> {
    if payload.len() > limits.max_payload_bytes {
        return Err(DecodeError::LimitsExceeded {
            kind: LimitKind::PayloadBytes,
            limit: limits.max_payload_bytes,
            actual: payload.len(),
        });
    }
    let mut reader = BitReader::new(payload);
    let message = M::read(&mut reader, limits)?;
    check_trailing(M::OPCODE, &reader, limits)?;
    Ok(message)
}

fn check_trailing(opcode: Opcode, reader: &BitReader<'_>, limits: &Limits) -> WireResult<()> {
    let remaining = reader.remaining();
    if remaining == 0 {
        return Ok(());
    }
    if limits.reject_trailing_bytes {
        return Err(DecodeError::TrailingBytes { opcode, remaining });
    }
    trace!(%opcode, remaining, "trailing bytes after message");
    Ok(())
}

/// Writes the presence bit for an optional field.
///
/// The value itself is written later, after the bit region is flushed.
pub fn write_presence<T>(writer: &mut BitWriter, field: &Option<T>) {
    writer.write_bit(field.is_some());
}

/// Reads an optional value whose presence bit was already read.
pub fn read_optional<T>(
    present: bool,
    read: impl FnOnce() -> WireResult<T>,
) -> WireResult<Option<T>> {
    if present {
        read().map(Some)
    } else {
        Ok(None)
    }
}
