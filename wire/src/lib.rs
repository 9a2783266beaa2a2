//! Field codecs, message contract and opcode dispatch for the realmwire protocol.
//!
//! This crate sits on top of [`bitstream`] and adds everything that knows
//! about protocol fields: packed identifiers, length-prefixed and
//! NUL-terminated strings, the [`Encodable`]/[`Decodable`] message roles, the
//! transport envelope and the [`OpcodeTable`] dispatcher.
//!
//! # Design Principles
//!
//! - **Implicit schemas** - A message's layout is the order of its field calls.
//! - **Bounded decoding** - Payload and string lengths are checked against [`Limits`].
//! - **Shared, immutable dispatch** - One table serves every session.
//!
//! See `WIRE_FORMAT.md` for the byte-level layout.

mod envelope;
mod error;
mod guid;
mod limits;
mod message;
mod opcode;
mod string;

pub use envelope::{
    decode_frame, encode_frame, Direction, FrameIter, InboundFrame, CLIENT_HEADER_SIZE,
    SERVER_HEADER_SIZE,
};
pub use error::{DecodeError, EncodeError, EncodeResult, LimitKind, WireResult};
pub use guid::{packed_guid_len, read_packed_guid, scattered, write_packed_guid, Guid};
pub use limits::Limits;
pub use message::{
    decode_message, encode_message, read_optional, write_presence, Decodable, Encodable,
    OutboundFrame,
};
pub use opcode::{
    ConnectionType, DispatchError, Opcode, OpcodeTable, OpcodeTableBuilder, OutboundEntry,
    SessionStatus, TableError,
};
pub use string::{
    read_cstring, read_sized_string, read_sized_string_len, read_str, read_string,
    write_cstring, write_sized_string, write_sized_string_len, write_string_bytes,
};
