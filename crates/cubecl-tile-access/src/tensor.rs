use crate::{coords::LongIndex, element::Element};

/// Read-only host view of tensor storage, addressed in bytes.
#[derive(Debug, Clone, Copy)]
pub struct TensorRef<'a, E: Element> {
    data: &'a [E],
}

impl<'a, E: Element> TensorRef<'a, E> {
    pub fn new(data: &'a [E]) -> Self {
        Self { data }
    }

    /// The `len` elements starting at byte offset `address`.
    ///
    /// Returns `None` when the range is out of the storage or not aligned to an element.
    pub fn vector(&self, address: LongIndex, len: usize) -> Option<&'a [E]> {
        let bytes: &'a [u8] = bytemuck::cast_slice(self.data);
        let range = byte_range::<E>(address, len, bytes.len())?;
        bytemuck::try_cast_slice(&bytes[range]).ok()
    }

    pub fn data(&self) -> &'a [E] {
        self.data
    }
}

/// Mutable host view of tensor storage, addressed in bytes.
#[derive(Debug)]
pub struct TensorMut<'a, E: Element> {
    data: &'a mut [E],
}

impl<'a, E: Element> TensorMut<'a, E> {
    pub fn new(data: &'a mut [E]) -> Self {
        Self { data }
    }

    /// Mutable access to the `len` elements starting at byte offset `address`.
    pub fn vector_mut(&mut self, address: LongIndex, len: usize) -> Option<&mut [E]> {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut *self.data);
        let range = byte_range::<E>(address, len, bytes.len())?;
        bytemuck::try_cast_slice_mut(&mut bytes[range]).ok()
    }

    pub fn as_tensor_ref(&self) -> TensorRef<'_, E> {
        TensorRef::new(&*self.data)
    }
}

fn byte_range<E: Element>(
    address: LongIndex,
    len: usize,
    size: usize,
) -> Option<core::ops::Range<usize>> {
    let start = usize::try_from(address).ok()?;
    let end = start.checked_add(len.checked_mul(core::mem::size_of::<E>())?)?;
    (end <= size).then_some(start..end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_aligned_vectors() {
        let data: [f32; 8] = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        let tensor = TensorRef::new(&data);

        assert_eq!(tensor.vector(8, 2), Some(&data[2..4]));
        assert_eq!(tensor.vector(28, 1), Some(&data[7..8]));
    }

    #[test]
    fn rejects_out_of_range_and_misaligned() {
        let data = [0u16; 4];
        let tensor = TensorRef::new(&data);

        assert_eq!(tensor.vector(6, 2), None);
        assert_eq!(tensor.vector(-2, 1), None);
        assert_eq!(tensor.vector(1, 1), None);
    }

    #[test]
    fn writes_through_byte_addresses() {
        let mut data = [0i32; 4];
        let mut tensor = TensorMut::new(&mut data);

        tensor.vector_mut(4, 2).unwrap().copy_from_slice(&[5, 6]);
        assert_eq!(data, [0, 5, 6, 0]);
    }
}
