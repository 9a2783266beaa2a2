use bitstream::{BitReader, BitWriter};
use wire::{
    decode_message, encode_message, read_optional, read_sized_string_len, read_string,
    scattered, write_presence, write_sized_string_len, write_string_bytes, ConnectionType,
    Decodable, DecodeError, Encodable, EncodeError, EncodeResult, Guid, Limits, Opcode,
    WireResult,
};

/// Chat line with grouped presence bits, two sized strings and a packed guid.
#[derive(Debug, Clone, PartialEq)]
struct ChatLine {
    sender: Guid,
    sender_name: String,
    text: String,
    channel: Option<u32>,
    is_gm: bool,
}

const CHAT_NAME_BITS: u8 = 6;
const CHAT_TEXT_BITS: u8 = 12;

impl Encodable for ChatLine {
    const OPCODE: Opcode = Opcode::new(0x2BAD);

    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Realm
    }

    fn size_hint(&self) -> usize {
        4 + 9 + 4 + self.sender_name.len() + self.text.len()
    }

    fn write(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        write_presence(writer, &self.channel);
        writer.write_bit(self.is_gm);
        write_sized_string_len(writer, &self.sender_name, CHAT_NAME_BITS)?;
        write_sized_string_len(writer, &self.text, CHAT_TEXT_BITS)?;
        writer.flush_bits();

        self.sender.write_packed(writer);
        if let Some(channel) = self.channel {
            writer.write_u32(channel);
        }
        write_string_bytes(writer, &self.sender_name);
        write_string_bytes(writer, &self.text);
        Ok(())
    }
}

impl Decodable for ChatLine {
    const OPCODE: Opcode = Opcode::new(0x2BAD);

    fn read(reader: &mut BitReader<'_>, limits: &Limits) -> WireResult<Self> {
        let has_channel = reader.has_bit()?;
        let is_gm = reader.has_bit()?;
        let name_len = read_sized_string_len(reader, CHAT_NAME_BITS)?;
        let text_len = read_sized_string_len(reader, CHAT_TEXT_BITS)?;
        reader.reset_bit_pos();

        let sender = Guid::read_packed(reader)?;
        let channel = read_optional(has_channel, || Ok(reader.read_u32()?))?;
        let sender_name = read_string(reader, name_len, limits)?;
        let text = read_string(reader, text_len, limits)?;
        Ok(Self {
            sender,
            sender_name,
            text,
            channel,
            is_gm,
        })
    }
}

/// Client request carrying a scattered guid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueryName {
    target: Guid,
    full_name: bool,
}

const QUERY_MASK_ORDER: [u8; 8] = [4, 7, 0, 1, 3, 5, 2, 6];
const QUERY_BYTE_ORDER: [u8; 8] = [0, 5, 1, 3, 6, 7, 4, 2];

impl Encodable for QueryName {
    const OPCODE: Opcode = Opcode::new(0x0050);

    fn write(&self, writer: &mut BitWriter) -> EncodeResult<()> {
        scattered::write_mask(writer, self.target, &QUERY_MASK_ORDER[..3]);
        writer.write_bit(self.full_name);
        scattered::write_mask(writer, self.target, &QUERY_MASK_ORDER[3..]);
        writer.flush_bits();
        scattered::write_bytes(writer, self.target, &QUERY_BYTE_ORDER);
        Ok(())
    }
}

impl Decodable for QueryName {
    const OPCODE: Opcode = Opcode::new(0x0050);

    fn read(reader: &mut BitReader<'_>, _limits: &Limits) -> WireResult<Self> {
        let mut target = scattered::GuidReader::new();
        target.read_mask(reader, &QUERY_MASK_ORDER[..3])?;
        let full_name = reader.has_bit()?;
        target.read_mask(reader, &QUERY_MASK_ORDER[3..])?;
        reader.reset_bit_pos();
        target.read_bytes(reader, &QUERY_BYTE_ORDER)?;
        Ok(Self {
            target: target.finish(),
            full_name,
        })
    }
}

fn sample_chat() -> ChatLine {
    ChatLine {
        sender: Guid::from_parts(0x0700, 0x42),
        sender_name: "Thrall".to_owned(),
        text: "For the Horde".to_owned(),
        channel: Some(3),
        is_gm: false,
    }
}

#[test]
fn chat_line_layout() {
    let frame = encode_message(&sample_chat()).unwrap();
    assert_eq!(frame.opcode, Opcode::new(0x2BAD));
    assert_eq!(frame.connection, ConnectionType::Realm);

    // 1 | 0 | 000110 | 000000001101 | 000000 padding
    assert_eq!(&frame.payload[..3], &[0b1000_0110, 0b0000_0000, 0b1101_0000]);
    // packed guid: bytes 0 and 7 present
    assert_eq!(&frame.payload[3..6], &[0b1000_0001, 0x42, 0x07]);
    assert_eq!(&frame.payload[6..10], &[3, 0, 0, 0]);
    assert_eq!(&frame.payload[10..16], b"Thrall");
    assert_eq!(&frame.payload[16..], b"For the Horde");
}

#[test]
fn chat_line_roundtrip() {
    let chat = sample_chat();
    let frame = encode_message(&chat).unwrap();
    let decoded: ChatLine = decode_message(&frame.payload, &Limits::for_testing()).unwrap();
    assert_eq!(decoded, chat);
}

#[test]
fn absent_optional_field_shifts_nothing_else() {
    let with = sample_chat();
    let without = ChatLine {
        channel: None,
        ..sample_chat()
    };
    let a = encode_message(&with).unwrap().payload;
    let b = encode_message(&without).unwrap().payload;
    assert_eq!(a.len(), b.len() + 4);
    assert_eq!(a[0] & 0x7F, b[0]);
    assert_eq!(&a[1..6], &b[1..6]);
    assert_eq!(&a[10..], &b[6..]);

    let decoded: ChatLine = decode_message(&b, &Limits::for_testing()).unwrap();
    assert_eq!(decoded, without);
}

#[test]
fn encode_does_not_mutate() {
    let chat = sample_chat();
    let first = encode_message(&chat).unwrap();
    let second = encode_message(&chat).unwrap();
    assert_eq!(first, second);
}

#[test]
fn name_too_long_for_width_fails_encode() {
    let chat = ChatLine {
        sender_name: "n".repeat(64),
        ..sample_chat()
    };
    let err = encode_message(&chat).unwrap_err();
    assert_eq!(err, EncodeError::StringTooLong { len: 64, bits: 6 });
}

#[test]
fn truncated_chat_line_fails() {
    let frame = encode_message(&sample_chat()).unwrap();
    let short = &frame.payload[..frame.payload.len() - 1];
    let err = decode_message::<ChatLine>(short, &Limits::for_testing()).unwrap_err();
    assert!(matches!(err, DecodeError::Truncated(_)));
}

#[test]
fn string_limit_applies_inside_messages() {
    let frame = encode_message(&sample_chat()).unwrap();
    let limits = Limits {
        max_string_len: 8,
        ..Limits::for_testing()
    };
    let err = decode_message::<ChatLine>(&frame.payload, &limits).unwrap_err();
    assert!(matches!(err, DecodeError::LimitsExceeded { .. }));
}

#[test]
fn query_name_roundtrip() {
    for target in [
        Guid::EMPTY,
        Guid::new(0x0100_0000_0000_0001),
        Guid::new(u64::MAX),
        Guid::from_parts(0xF130, 0x00AB_CDEF),
    ] {
        let query = QueryName {
            target,
            full_name: true,
        };
        let frame = encode_message(&query).unwrap();
        let decoded: QueryName =
            decode_message(&frame.payload, &Limits::for_testing().strict()).unwrap();
        assert_eq!(decoded, query);
    }
}

#[test]
fn query_name_layout() {
    // Bytes 0 (0x01) and 4 (0x10) present.
    let query = QueryName {
        target: Guid::from_le_bytes([0x01, 0, 0, 0, 0x10, 0, 0, 0]),
        full_name: true,
    };
    let frame = encode_message(&query).unwrap();
    // mask order 4,7,0 -> 1,0,1; flag 1; then 1,3,5,2,6 -> 0,0,0,0,0 (9 bits)
    assert_eq!(&frame.payload[..2], &[0b1011_0000, 0b0000_0000]);
    // byte order visits 0 before 4, each XOR-ed with 0x01
    assert_eq!(&frame.payload[2..], &[0x00, 0x11]);
}
