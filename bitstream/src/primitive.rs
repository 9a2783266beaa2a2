//! Byte-aligned fixed-width primitives.
//!
//! Every multi-byte value travels little-endian. These codecs operate on the
//! byte cursor only and never touch the pending bit accumulator.

/// A fixed-width value with a little-endian wire form.
pub trait Primitive: Copy {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Appends the little-endian encoding of `self` to `out`.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decodes a value from exactly [`Self::SIZE`] bytes.
    ///
    /// Callers must pass a slice of length `SIZE`; the reader guarantees this.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_primitive {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const SIZE: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_le(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_le(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }
            }
        )*
    };
}

impl_primitive!(u8, u16, u32, u64, i8, i16, i32, i64, f32, f64);
