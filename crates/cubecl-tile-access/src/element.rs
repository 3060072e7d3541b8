use core::fmt::Debug;

use crate::coords::LongIndex;

/// Element stored in a tensor streamed by a tile access iterator.
///
/// Only the bit width matters for address computation.
pub trait Element: bytemuck::Pod + Debug + Default + Send + Sync + 'static {
    /// Width of one element in bits.
    const BITS: u32;

    /// Byte size of `count` elements.
    fn bytes(count: LongIndex) -> LongIndex {
        count * Self::BITS as LongIndex / 8
    }
}

macro_rules! impl_element {
    ($($ty:ty),*) => {
        $(
            impl Element for $ty {
                const BITS: u32 = (core::mem::size_of::<$ty>() * 8) as u32;
            }
        )*
    };
}

impl_element!(
    u8,
    i8,
    u16,
    i16,
    u32,
    i32,
    u64,
    i64,
    f32,
    f64,
    half::f16,
    half::bf16
);
