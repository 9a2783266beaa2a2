use bitstream::{BitError, BitReader, BitWriter};

#[test]
fn three_bits_flush_produce_one_byte() {
    let mut writer = BitWriter::new();
    writer.write_bit(true);
    writer.write_bit(false);
    writer.write_bit(true);
    writer.flush_bits();
    let bytes = writer.finish();
    assert_eq!(bytes, vec![0b1010_0000]);

    let mut reader = BitReader::new(&bytes);
    assert!(reader.has_bit().unwrap());
    assert!(!reader.has_bit().unwrap());
    assert!(reader.has_bit().unwrap());
    reader.reset_bit_pos();
    assert!(reader.is_aligned());
    assert!(reader.is_empty());
}

#[test]
fn presence_bits_grouped_before_values() {
    // Two optional fields: first present, second absent.
    let mut writer = BitWriter::new();
    writer.write_bit(true);
    writer.write_bit(false);
    writer.write_bits(3, 5).unwrap();
    writer.flush_bits();
    writer.write_u32(77);
    let bytes = writer.finish();
    assert_eq!(bytes, vec![0b1000_0110, 77, 0, 0, 0]);

    let mut reader = BitReader::new(&bytes);
    let has_first = reader.has_bit().unwrap();
    let has_second = reader.has_bit().unwrap();
    let count = reader.read_bits(5).unwrap();
    reader.reset_bit_pos();
    assert!(has_first);
    assert!(!has_second);
    assert_eq!(count, 3);
    assert_eq!(reader.read_u32().unwrap(), 77);
}

#[test]
fn truncated_message_is_error() {
    let mut writer = BitWriter::new();
    writer.write_u16(1);
    let bytes = writer.finish();

    let mut reader = BitReader::new(&bytes);
    assert_eq!(reader.read_u16().unwrap(), 1);
    assert!(matches!(
        reader.read_u32(),
        Err(BitError::Truncated {
            requested: 4,
            available: 0
        })
    ));
    assert!(matches!(
        reader.read_bit(),
        Err(BitError::UnexpectedEof { .. })
    ));
}

#[test]
fn independent_buffers_do_not_interfere() {
    let mut a = BitWriter::new();
    let mut b = BitWriter::new();
    a.write_bit(true);
    b.write_bits(0b11, 2).unwrap();
    a.write_bit(true);
    assert_eq!(a.finish(), vec![0b1100_0000]);
    assert_eq!(b.finish(), vec![0b1100_0000]);
}
