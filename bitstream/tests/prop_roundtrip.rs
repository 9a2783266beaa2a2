use bitstream::{BitReader, BitWriter};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Bit(bool),
    Bits { bits: u8, value: u32 },
    Flush,
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    F32(f32),
    Bytes(Vec<u8>),
}

impl Op {
    const fn is_bit_level(&self) -> bool {
        matches!(self, Self::Bit(_) | Self::Bits { .. })
    }
}

fn mask_value(bits: u8, value: u32) -> u32 {
    if bits >= 32 {
        value
    } else {
        value & ((1u32 << bits) - 1)
    }
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Bit),
        (1u8..=32, any::<u32>()).prop_map(|(bits, value)| Op::Bits {
            bits,
            value: mask_value(bits, value),
        }),
        Just(Op::Flush),
        any::<u8>().prop_map(Op::U8),
        any::<u16>().prop_map(Op::U16),
        any::<u32>().prop_map(Op::U32),
        any::<u64>().prop_map(Op::U64),
        any::<i32>().prop_map(Op::I32),
        any::<f32>()
            .prop_filter("NaN payloads compare unequal", |v| !v.is_nan())
            .prop_map(Op::F32),
        prop::collection::vec(any::<u8>(), 0..16).prop_map(Op::Bytes),
    ]
}

proptest! {
    #[test]
    fn prop_bits_roundtrip(bits in 1u8..=32, raw in any::<u32>()) {
        let value = mask_value(bits, raw);
        let mut writer = BitWriter::new();
        writer.write_bits(value, bits).unwrap();
        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);
        prop_assert_eq!(reader.read_bits(bits).unwrap(), value);
    }

    #[test]
    fn prop_whole_bytes_of_bits_leave_writer_clean(bits in prop::collection::vec(any::<bool>(), 0..64)) {
        let whole = bits.len() / 8 * 8;
        let mut writer = BitWriter::new();
        for bit in &bits[..whole] {
            writer.write_bit(*bit);
        }
        prop_assert!(writer.is_aligned());
        prop_assert_eq!(writer.len(), whole / 8);
    }

    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..64)) {
        let mut writer = BitWriter::new();

        // Writer side: flush before any byte-aligned op that follows bit-level ops.
        for op in &ops {
            if !op.is_bit_level() {
                writer.flush_bits();
            }
            match op {
                Op::Bit(b) => writer.write_bit(*b),
                Op::Bits { bits, value } => writer.write_bits(*value, *bits).unwrap(),
                Op::Flush => {}
                Op::U8(v) => writer.write_u8(*v),
                Op::U16(v) => writer.write_u16(*v),
                Op::U32(v) => writer.write_u32(*v),
                Op::U64(v) => writer.write_u64(*v),
                Op::I32(v) => writer.write_i32(*v),
                Op::F32(v) => writer.write_f32(*v),
                Op::Bytes(v) => writer.write_bytes(v),
            }
        }

        let bytes = writer.finish();
        let mut reader = BitReader::new(&bytes);

        // Reader side mirrors it with reset_bit_pos.
        for op in &ops {
            if !op.is_bit_level() {
                reader.reset_bit_pos();
            }
            match op {
                Op::Bit(b) => {
                    prop_assert_eq!(reader.read_bit().unwrap(), *b);
                }
                Op::Bits { bits, value } => {
                    prop_assert_eq!(reader.read_bits(*bits).unwrap(), *value);
                }
                Op::Flush => {}
                Op::U8(v) => {
                    prop_assert_eq!(reader.read_u8().unwrap(), *v);
                }
                Op::U16(v) => {
                    prop_assert_eq!(reader.read_u16().unwrap(), *v);
                }
                Op::U32(v) => {
                    prop_assert_eq!(reader.read_u32().unwrap(), *v);
                }
                Op::U64(v) => {
                    prop_assert_eq!(reader.read_u64().unwrap(), *v);
                }
                Op::I32(v) => {
                    prop_assert_eq!(reader.read_i32().unwrap(), *v);
                }
                Op::F32(v) => {
                    prop_assert_eq!(reader.read_f32().unwrap().to_bits(), v.to_bits());
                }
                Op::Bytes(v) => {
                    prop_assert_eq!(reader.read_bytes(v.len()).unwrap(), v.as_slice());
                }
            }
        }
        reader.reset_bit_pos();
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_short_buffer_is_error_not_panic(data in prop::collection::vec(any::<u8>(), 0..8), bits in 1u8..=32) {
        let mut reader = BitReader::new(&data);
        let result = reader.read_bits(bits);
        prop_assert_eq!(result.is_ok(), data.len() * 8 >= bits as usize);
        let mut reader = BitReader::new(&data);
        prop_assert_eq!(reader.read_u64().is_ok(), data.len() >= 8);
    }
}
