//! Host drivers walking one tile of accesses the way a kernel loop does.

use crate::{
    element::Element,
    layout::TileAccess,
    tensor::{TensorMut, TensorRef},
};

/// Loads the accesses of one tile into `fragment`, then leaves `iter` on the next tile.
///
/// Access `i` fills `fragment[i * access_elements..(i + 1) * access_elements]`. Invalid
/// accesses are zero-filled. Returns the number of valid accesses.
///
/// # Panics
///
/// Panics if `fragment` is shorter than one tile of accesses.
pub fn load_fragment<E: Element, I: TileAccess>(
    iter: &mut I,
    tensor: &TensorRef<'_, E>,
    fragment: &mut [E],
) -> u32 {
    let width = iter.access_elements() as usize;
    let count = iter.access_count() as usize;
    assert!(
        fragment.len() >= width * count,
        "Fragment of {} elements cannot hold {count} accesses of {width}",
        fragment.len()
    );

    let mut loaded = 0;
    for vector in fragment.chunks_exact_mut(width).take(count) {
        let source = if iter.valid() {
            iter.get().and_then(|address| tensor.vector(address, width))
        } else {
            None
        };

        match source {
            Some(source) => {
                vector.copy_from_slice(source);
                loaded += 1;
            }
            None => vector.fill(E::default()),
        }

        iter.advance();
    }

    loaded
}

/// Stores the valid accesses of one tile from `fragment`, then leaves `iter` on the next tile.
///
/// Returns the number of valid accesses.
///
/// # Panics
///
/// Panics if `fragment` is shorter than one tile of accesses.
pub fn store_fragment<E: Element, I: TileAccess>(
    iter: &mut I,
    tensor: &mut TensorMut<'_, E>,
    fragment: &[E],
) -> u32 {
    let width = iter.access_elements() as usize;
    let count = iter.access_count() as usize;
    assert!(
        fragment.len() >= width * count,
        "Fragment of {} elements cannot hold {count} accesses of {width}",
        fragment.len()
    );

    let mut stored = 0;
    for vector in fragment.chunks_exact(width).take(count) {
        if iter.valid() {
            let target = iter
                .get()
                .and_then(|address| tensor.vector_mut(address, width));

            if let Some(target) = target {
                target.copy_from_slice(vector);
                stored += 1;
            }
        }

        iter.advance();
    }

    stored
}
